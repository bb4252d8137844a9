use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use devcamper_auth::jwt::{NOT_AUTHORIZED, verify_token};
use devcamper_core::AppError;
use devcamper_models::{Role, User};

use crate::logging::RequestUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie value written by logout.
pub const LOGGED_OUT_TOKEN: &str = "none";

/// Extractor that verifies the session token and loads the caller.
///
/// The user row is loaded on every request, so deleted users and role
/// changes take effect immediately. The result is cached in the request
/// extensions for later extractors of the same request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.0.role)
    }
}

/// Reads the session token: the `Authorization: Bearer` header wins over
/// the `token` cookie, and the logout placeholder counts as no token.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty() && token != LOGGED_OUT_TOKEN)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<AuthUser>() {
            return Ok(cached.clone());
        }

        let token = extract_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHORIZED.to_string()))?;

        let user_id = verify_token(&token, &state.jwt_config)?.user_id()?;

        let user = UserService::find_user(&state.db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHORIZED.to_string()))?;

        if let Some(slot) = parts.extensions.get::<RequestUser>() {
            slot.set(user.id);
        }

        let auth_user = AuthUser(user);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}
