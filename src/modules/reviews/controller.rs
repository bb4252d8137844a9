use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use devcamper_core::response::Empty;
use devcamper_core::{ApiResponse, AppError, ListingResponse};
use devcamper_models::{CreateReviewDto, REVIEW_LISTING, Review, UpdateReviewDto};

use super::service::ReviewService;
use crate::metrics::track_review_created;
use crate::middleware::extract::{ListingParams, ResourceId};
use crate::middleware::policy::{Action, authorize_owner};
use crate::middleware::role::RequireReviewer;
use crate::modules::bootcamps::service::BootcampService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List all reviews
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, `-` for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 25, max 100)")
    ),
    responses(
        (status = 200, description = "Paginated reviews with their bootcamp", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter")
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_reviews(
    State(state): State<AppState>,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&REVIEW_LISTING)?;
    let reviews = ReviewService::get_reviews(&state.db, None, query).await?;
    Ok(Json(reviews))
}

/// List the reviews of a bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    responses(
        (status = 200, description = "Paginated reviews of the bootcamp", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter"),
        (status = 404, description = "Malformed bootcamp id")
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp_reviews(
    State(state): State<AppState>,
    ResourceId(bootcamp_id): ResourceId,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&REVIEW_LISTING)?;
    let reviews = ReviewService::get_reviews(&state.db, Some(bootcamp_id), query).await?;
    Ok(Json(reviews))
}

/// Get a single review with its bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = uuid::Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review with its bootcamp", body = ApiResponse<Review>),
        (status = 404, description = "Review not found")
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_review(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let review = ReviewService::get_review_document(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// Review a bootcamp (users and admins, once per bootcamp)
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    request_body = CreateReviewDto,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Validation error or bootcamp already reviewed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Bootcamp not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn add_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    ResourceId(bootcamp_id): ResourceId,
    ValidatedJson(dto): ValidatedJson<CreateReviewDto>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, bootcamp_id).await?;

    let review = ReviewService::add_review(&state.db, bootcamp.id, auth_user.id(), dto).await?;
    track_review_created(review.rating);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// Update a review (author or admin)
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    params(("id" = uuid::Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewDto,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    ResourceId(id): ResourceId,
    ValidatedJson(dto): ValidatedJson<UpdateReviewDto>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = ReviewService::get_review(&state.db, id).await?;
    authorize_owner(&auth_user, &review, Action::Update)?;

    let review = ReviewService::update_review(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// Delete a review (author or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = uuid::Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn delete_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let review = ReviewService::get_review(&state.db, id).await?;
    authorize_owner(&auth_user, &review, Action::Delete)?;

    ReviewService::delete_review(&state.db, &review).await?;
    Ok(Json(ApiResponse::ok(Empty::default())))
}
