use anyhow::anyhow;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use devcamper_core::file_storage::StorageError;
use devcamper_core::response::Empty;
use devcamper_core::{ApiResponse, AppError, ListingResponse};
use devcamper_models::{BOOTCAMP_LISTING, Bootcamp, CreateBootcampDto, UpdateBootcampDto};

use super::service::{BootcampService, PhotoUpload};
use crate::metrics::{track_bootcamp_created, track_photo_upload};
use crate::middleware::extract::{ListingParams, ResourceId};
use crate::middleware::policy::{Action, authorize_owner};
use crate::middleware::role::RequirePublisher;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List bootcamps
///
/// Any field can be filtered with `field=value` or `field[op]=value`, where
/// `op` is one of `gt`, `gte`, `lt`, `lte`, `ne`, `in`.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, `-` for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 25, max 100)")
    ),
    responses(
        (status = 200, description = "Paginated bootcamps with their courses", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter")
    ),
    tag = "Bootcamps"
)]
#[instrument(skip(state))]
pub async fn get_bootcamps(
    State(state): State<AppState>,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&BOOTCAMP_LISTING)?;
    let bootcamps = BootcampService::get_bootcamps(&state.db, &query).await?;
    Ok(Json(bootcamps))
}

/// Get a single bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    responses(
        (status = 200, description = "Bootcamp", body = ApiResponse<Bootcamp>),
        (status = 404, description = "Bootcamp not found")
    ),
    tag = "Bootcamps"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<Bootcamp>>, AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(bootcamp)))
}

/// Create a bootcamp owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    request_body = CreateBootcampDto,
    responses(
        (status = 201, description = "Bootcamp created", body = ApiResponse<Bootcamp>),
        (status = 400, description = "Validation error, duplicate name or publisher already owns a bootcamp"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn create_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ValidatedJson(dto): ValidatedJson<CreateBootcampDto>,
) -> Result<(StatusCode, Json<ApiResponse<Bootcamp>>), AppError> {
    let bootcamp = BootcampService::create_bootcamp(&state.db, &auth_user, dto).await?;
    track_bootcamp_created();
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(bootcamp))))
}

/// Update a bootcamp (owner or admin)
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    request_body = UpdateBootcampDto,
    responses(
        (status = 200, description = "Bootcamp updated", body = ApiResponse<Bootcamp>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Bootcamp not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(id): ResourceId,
    ValidatedJson(dto): ValidatedJson<UpdateBootcampDto>,
) -> Result<Json<ApiResponse<Bootcamp>>, AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
    authorize_owner(&auth_user, &bootcamp, Action::Update)?;

    let bootcamp = BootcampService::update_bootcamp(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::ok(bootcamp)))
}

/// Delete a bootcamp with its courses and reviews (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    responses(
        (status = 200, description = "Bootcamp deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Bootcamp not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
    authorize_owner(&auth_user, &bootcamp, Action::Delete)?;

    BootcampService::delete_bootcamp(&state.db, &bootcamp, &state.photo_storage).await?;
    Ok(Json(ApiResponse::ok(Empty::default())))
}

/// Upload a bootcamp photo (owner or admin)
///
/// Multipart form with a single image in the `file` field.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}/photo",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Stored file name", body = ApiResponse<String>),
        (status = 400, description = "No file, not an image, or too large"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Bootcamp not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.id()))]
pub async fn upload_bootcamp_photo(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(id): ResourceId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
    authorize_owner(&auth_user, &bootcamp, Action::UploadPhoto)?;

    let max_bytes = state.upload_config.max_file_upload;
    let upload = match multipart {
        Ok(multipart) => read_photo(multipart, max_bytes).await?,
        Err(_) => None,
    }
    .ok_or_else(|| AppError::bad_request(anyhow!("Please upload a file")))?;

    let result = BootcampService::upload_photo(
        &state.db,
        &bootcamp,
        upload,
        max_bytes,
        &state.photo_storage,
    )
    .await;
    track_photo_upload(if result.is_ok() { "accepted" } else { "rejected" });

    Ok(Json(ApiResponse::ok(result?)))
}

/// First part named `file`, if any.
async fn read_photo(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Option<PhotoUpload>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;

        return Ok(Some(PhotoUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return StorageError::InvalidFileSize { max_bytes }.into();
    }
    AppError::bad_request(anyhow!("Problem with file upload: {}", err.body_text()))
}
