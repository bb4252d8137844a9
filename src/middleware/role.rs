//! Role-based authorization.
//!
//! Two ways to gate a route on the caller's role:
//! 1. Extractors generated by [`require_role!`], e.g. [`RequirePublisher`]
//! 2. Route middleware, e.g. [`require_admin`] for a whole router
//!
//! Both authenticate first, so a missing or invalid token is a 401 and a
//! wrong role is a 403.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use devcamper_core::AppError;
use devcamper_models::Role;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Fails with 403 unless the caller holds one of `allowed_roles`.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    if auth_user.has_any_role(allowed_roles) {
        return Ok(());
    }
    Err(AppError::forbidden(format!(
        "User role {} is not authorized to access this route",
        auth_user.role()
    )))
}

/// Defines an extractor that authenticates the caller and requires one of
/// the listed roles.
#[macro_export]
macro_rules! require_role {
    ($name:ident, [$($role:expr),+ $(,)?]) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = devcamper_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                $crate::middleware::role::check_any_role(&auth_user, &[$($role),+])?;
                Ok($name(auth_user))
            }
        }
    };
}

// Bootcamp and course management
require_role!(RequirePublisher, [Role::Publisher, Role::Admin]);
// Writing reviews
require_role!(RequireReviewer, [Role::User, Role::Admin]);
// User administration
require_role!(RequireAdmin, [Role::Admin]);

/// Route middleware requiring one of `allowed_roles`.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed_roles: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Middleware for admin-only routers.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/users", init_users_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, &[Role::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
