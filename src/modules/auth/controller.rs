use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::CookieJar;
use tracing::instrument;

use devcamper_core::response::Empty;
use devcamper_core::{ApiResponse, AppError};
use devcamper_models::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, TokenResponse,
    UpdateDetailsRequest, UpdatePasswordRequest, User,
};

use super::cookie::{logout_cookie, session_cookie};
use super::service::AuthService;
use crate::metrics::{track_login, track_user_registered};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Sets the session cookie and returns the token in the body as well.
fn token_response(
    state: &AppState,
    jar: CookieJar,
    token: String,
) -> (CookieJar, Json<TokenResponse>) {
    let secure = state.app_config.environment.is_production();
    let jar = jar.add(session_cookie(token.clone(), &state.jwt_config, secure));
    (jar, Json(TokenResponse::new(token)))
}

/// Register a new user or publisher
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, session cookie set", body = TokenResponse),
        (status = 400, description = "Validation error, duplicate email or admin role")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let role = dto.role;
    let token = AuthService::register(&state.db, dto, &state.jwt_config).await?;
    track_user_registered(role.as_str());
    Ok(token_response(&state, jar, token))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = TokenResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let result = AuthService::login(&state.db, dto, &state.jwt_config).await;
    track_login(result.is_ok());
    Ok(token_response(&state, jar, result?))
}

/// Log out by replacing the session cookie
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<Empty>)
    ),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<Empty>>) {
    (
        jar.add(logout_cookie()),
        Json(ApiResponse::ok(Empty::default())),
    )
}

/// Get the logged in user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(auth_user), fields(user_id = %auth_user.id()))]
pub async fn me(auth_user: AuthUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::ok(auth_user.0))
}

/// Update the logged in user's name and email
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatedetails",
    request_body = UpdateDetailsRequest,
    responses(
        (status = 200, description = "Details updated", body = ApiResponse<User>),
        (status = 400, description = "Validation error or duplicate email"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_details(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateDetailsRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = AuthService::update_details(&state.db, auth_user.id(), dto).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Change the logged in user's password
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatepassword",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed, new session cookie set", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated or current password incorrect")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_password(
    State(state): State<AppState>,
    jar: CookieJar,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdatePasswordRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let token =
        AuthService::update_password(&state.db, auth_user.id(), dto, &state.jwt_config).await?;
    Ok(token_response(&state, jar, token))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgotpassword",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent", body = ApiResponse<String>),
        (status = 404, description = "No user with that email"),
        (status = 500, description = "Email could not be sent")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    AuthService::forgot_password(&state.db, &dto.email, &state.email_config).await?;
    Ok(Json(ApiResponse::ok("Email sent")))
}

/// Set a new password using an emailed reset token
#[utoipa::path(
    put,
    path = "/api/v1/auth/resetpassword/{resettoken}",
    params(("resettoken" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset, session cookie set", body = TokenResponse),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(reset_token): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let token =
        AuthService::reset_password(&state.db, &reset_token, dto, &state.jwt_config).await?;
    Ok(token_response(&state, jar, token))
}
