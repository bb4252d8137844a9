use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use devcamper_core::response::Empty;
use devcamper_core::{ApiResponse, AppError, ListingResponse};
use devcamper_models::{CreateUserDto, USER_LISTING, UpdateUserDto, User};

use crate::middleware::extract::{ListingParams, ResourceId};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, `-` for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 25, max 100)")
    ),
    responses(
        (status = 200, description = "Paginated users", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&USER_LISTING)?;
    let users = UserService::get_users(&state.db, &query).await?;
    Ok(Json(users))
}

/// Get a single user (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<User>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Create a user with any role (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<User>),
        (status = 400, description = "Validation error or duplicate email")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 400, description = "Validation error or duplicate email"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::update_user(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Delete a user and everything they own (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<Empty>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    UserService::delete_user(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(Empty::default())))
}
