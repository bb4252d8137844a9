//! The `token` session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use devcamper_config::JwtConfig;

use crate::middleware::auth::{LOGGED_OUT_TOKEN, TOKEN_COOKIE};

/// Seconds the logout placeholder cookie lives.
pub const LOGOUT_COOKIE_TTL_SECONDS: i64 = 10;

pub fn session_cookie(token: String, jwt_config: &JwtConfig, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .expires(OffsetDateTime::now_utc() + Duration::days(jwt_config.cookie_expiry_days))
        .build()
}

/// Overwrites the session with a short-lived placeholder.
pub fn logout_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, LOGGED_OUT_TOKEN))
        .http_only(true)
        .path("/")
        .expires(OffsetDateTime::now_utc() + Duration::seconds(LOGOUT_COOKIE_TTL_SECONDS))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "secret".to_string(),
            token_expiry_days: 30,
            cookie_expiry_days: 30,
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), &jwt_config(), false);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.secure(), Some(true));

        let expires = cookie.expires_datetime().unwrap();
        let days = (expires - OffsetDateTime::now_utc()).whole_days();
        assert!((29..=30).contains(&days));
    }

    #[test]
    fn test_session_cookie_is_secure_in_production() {
        let cookie = session_cookie("abc".to_string(), &jwt_config(), true);
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_logout_cookie() {
        let cookie = logout_cookie();
        assert_eq!(cookie.value(), "none");
        assert_eq!(cookie.http_only(), Some(true));
        let remaining = cookie.expires_datetime().unwrap() - OffsetDateTime::now_utc();
        assert!(remaining <= Duration::seconds(10));
    }
}
