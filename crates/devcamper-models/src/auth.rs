//! Authentication DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::Role;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    #[schema(example = "john@gmail.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// `user` (default) or `publisher`
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Please provide an email and password"))]
    #[schema(example = "john@gmail.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Please provide an email and password"))]
    #[schema(example = "123456")]
    pub password: String,
}

/// `{ "success": true, "token": "..." }`, sent with the `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            success: true,
            token,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDetailsRequest {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Please provide your current password"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please add a valid email"))]
    #[schema(example = "john@gmail.com")]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_to_user_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"John Doe","email":"john@gmail.com","password":"123456"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::User);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: String::new(),
            password: "123456".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_password_request_validation() {
        let req = UpdatePasswordRequest {
            current_password: "123456".to_string(),
            new_password: "12".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
