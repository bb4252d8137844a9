use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use devcamper_core::response::Empty;
use devcamper_core::{ApiResponse, AppError, ListingResponse};
use devcamper_models::{COURSE_LISTING, Course, CreateCourseDto, UpdateCourseDto};

use super::service::CourseService;
use crate::middleware::extract::{ListingParams, ResourceId};
use crate::middleware::policy::{Action, authorize_owner};
use crate::middleware::role::RequirePublisher;
use crate::modules::bootcamps::service::BootcampService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List all courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, `-` for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 25, max 100)")
    ),
    responses(
        (status = 200, description = "Paginated courses with their bootcamp", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&COURSE_LISTING)?;
    let courses = CourseService::get_courses(&state.db, None, query).await?;
    Ok(Json(courses))
}

/// List the courses of a bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    responses(
        (status = 200, description = "Paginated courses of the bootcamp", body = ListingResponse),
        (status = 400, description = "Invalid listing parameter"),
        (status = 404, description = "Malformed bootcamp id")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp_courses(
    State(state): State<AppState>,
    ResourceId(bootcamp_id): ResourceId,
    params: ListingParams,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.parse(&COURSE_LISTING)?;
    let courses = CourseService::get_courses(&state.db, Some(bootcamp_id), query).await?;
    Ok(Json(courses))
}

/// Get a single course with its bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = uuid::Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with its bootcamp", body = ApiResponse<Course>),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let course = CourseService::get_course_document(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// Add a course to a bootcamp (bootcamp owner or admin)
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = uuid::Uuid, Path, description = "Bootcamp ID")),
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the bootcamp owner"),
        (status = 404, description = "Bootcamp not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn add_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(bootcamp_id): ResourceId,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, bootcamp_id).await?;
    authorize_owner(&auth_user, &bootcamp, Action::AddCourse)?;

    let course = CourseService::add_course(&state.db, bootcamp.id, auth_user.id(), dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(course))))
}

/// Update a course (owner or admin)
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = uuid::Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(id): ResourceId,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    authorize_owner(&auth_user, &course, Action::Update)?;

    let course = CourseService::update_course(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// Delete a course (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = uuid::Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ResourceId(id): ResourceId,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    authorize_owner(&auth_user, &course, Action::Delete)?;

    CourseService::delete_course(&state.db, &course).await?;
    Ok(Json(ApiResponse::ok(Empty::default())))
}
