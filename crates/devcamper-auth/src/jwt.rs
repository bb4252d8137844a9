//! Creation and verification of session tokens.
//!
//! Tokens are signed with HS256 using `JWT_SECRET` and expire after
//! `JWT_EXPIRE_DAYS`. Verification uses the default `jsonwebtoken`
//! validation, which checks the signature and `exp`.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use devcamper_config::JwtConfig;
use devcamper_core::AppError;

use crate::claims::Claims;

/// Message of every token rejection. Callers cannot tell a forged token from
/// an expired one.
pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";

pub fn create_token(user_id: Uuid, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.token_expiry_seconds() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(NOT_AUTHORIZED.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use devcamper_core::ErrorKind;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_expiry_days: 30,
            cookie_expiry_days: 30,
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_token(user_id, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_verify_token_with_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_token(Uuid::new_v4(), &config).unwrap();

        let other = JwtConfig {
            secret: "a-completely-different-secret-value".to_string(),
            ..config
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
        assert_eq!(err.public_message(), NOT_AUTHORIZED);
    }

    #[test]
    fn test_verify_malformed_token() {
        let config = get_test_jwt_config();
        assert!(verify_token("not.a.token", &config).is_err());
        assert!(verify_token("", &config).is_err());
    }

    #[test]
    fn test_verify_expired_token() {
        let config = get_test_jwt_config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            // well past the default 60s leeway
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
    }
}
