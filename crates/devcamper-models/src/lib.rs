//! # DevCamper Models
//!
//! Domain models and DTOs for the DevCamper API.
//!
//! Each resource module holds the database row type, the request DTOs with
//! their validation rules, and the [`ResourceSchema`] describing what
//! clients may filter, sort and select on when listing the collection.
//!
//! - [`auth`]: register/login/password DTOs
//! - [`bootcamps`]: bootcamps and the careers vocabulary
//! - [`courses`]: courses and skill levels
//! - [`reviews`]: reviews
//! - [`users`]: users and roles
//!
//! [`ResourceSchema`]: devcamper_core::ResourceSchema

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

pub use auth::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, TokenResponse,
    UpdateDetailsRequest, UpdatePasswordRequest,
};
pub use bootcamps::{
    BOOTCAMP_LISTING, Bootcamp, CAREERS, CreateBootcampDto, UpdateBootcampDto, generate_slug,
};
pub use courses::{COURSE_LISTING, Course, CreateCourseDto, SkillLevel, UpdateCourseDto};
pub use reviews::{CreateReviewDto, REVIEW_LISTING, Review, UpdateReviewDto};
pub use users::{CreateUserDto, Role, USER_LISTING, UpdateUserDto, User, UserCredentials};
