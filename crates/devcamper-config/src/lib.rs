//! # DevCamper Config
//!
//! Configuration types for the DevCamper API, each loaded from environment
//! variables with development defaults:
//!
//! - [`app`]: environment name and listen port
//! - [`jwt`]: session token secret and lifetimes
//! - [`cors`]: allowed origins
//! - [`email`]: SMTP settings for password reset mail
//! - [`upload`]: photo upload limits and location
//!
//! # Example
//!
//! ```ignore
//! use devcamper_config::{AppConfig, JwtConfig, UploadConfig};
//!
//! let app_config = AppConfig::from_env();
//! let jwt_config = JwtConfig::from_env();
//! let upload_config = UploadConfig::from_env();
//! ```

pub mod app;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod upload;

pub use app::{AppConfig, Environment};
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use upload::UploadConfig;
