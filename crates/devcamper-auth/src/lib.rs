//! # DevCamper Auth
//!
//! Session tokens for the DevCamper API: HS256 JWTs identifying a user,
//! issued on register/login and verified on every protected request.
//!
//! # Example
//!
//! ```ignore
//! use devcamper_auth::{create_token, verify_token};
//! use devcamper_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_token(user_id, &config)?;
//! let user_id = verify_token(&token, &config)?.user_id()?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_token, verify_token};
