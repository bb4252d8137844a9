use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use devcamper_core::ListingResponse;
use devcamper_core::pagination::{PageRef, Pagination};
use devcamper_core::response::Empty;
use devcamper_models::{
    Bootcamp, Course, CreateBootcampDto, CreateCourseDto, CreateReviewDto, CreateUserDto,
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, Review, Role,
    SkillLevel, TokenResponse, UpdateBootcampDto, UpdateCourseDto, UpdateDetailsRequest,
    UpdatePasswordRequest, UpdateReviewDto, UpdateUserDto, User,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::update_details,
        crate::modules::auth::controller::update_password,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::bootcamps::controller::get_bootcamps,
        crate::modules::bootcamps::controller::get_bootcamp,
        crate::modules::bootcamps::controller::create_bootcamp,
        crate::modules::bootcamps::controller::update_bootcamp,
        crate::modules::bootcamps::controller::delete_bootcamp,
        crate::modules::bootcamps::controller::upload_bootcamp_photo,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_bootcamp_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::add_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::reviews::controller::get_reviews,
        crate::modules::reviews::controller::get_bootcamp_reviews,
        crate::modules::reviews::controller::get_review,
        crate::modules::reviews::controller::add_review,
        crate::modules::reviews::controller::update_review,
        crate::modules::reviews::controller::delete_review,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            UpdateDetailsRequest,
            UpdatePasswordRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            User,
            Role,
            CreateUserDto,
            UpdateUserDto,
            Bootcamp,
            CreateBootcampDto,
            UpdateBootcampDto,
            Course,
            SkillLevel,
            CreateCourseDto,
            UpdateCourseDto,
            Review,
            CreateReviewDto,
            UpdateReviewDto,
            ListingResponse,
            Pagination,
            PageRef,
            Empty,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password management"),
        (name = "Bootcamps", description = "Bootcamp directory"),
        (name = "Courses", description = "Courses offered by bootcamps"),
        (name = "Reviews", description = "Bootcamp reviews"),
        (name = "Users", description = "User administration (admin only)")
    ),
    info(
        title = "DevCamper API",
        version = "1.0.0",
        description = "Bootcamp directory API: bootcamps, courses, reviews and users.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/login",
            "/api/v1/bootcamps/{id}/photo",
            "/api/v1/bootcamps/{id}/courses",
            "/api/v1/reviews/{id}",
            "/api/v1/users",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
        assert!(schemes.contains_key("cookie_auth"));
    }
}
