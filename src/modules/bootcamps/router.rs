use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::bootcamps::controller::{
    create_bootcamp, delete_bootcamp, get_bootcamp, get_bootcamps, update_bootcamp,
    upload_bootcamp_photo,
};
use crate::modules::courses::router::init_bootcamp_courses_router;
use crate::modules::reviews::router::init_bootcamp_reviews_router;
use crate::state::AppState;

/// Bootcamp routes. The nested course and review routers share the `{id}`
/// parameter, which is the bootcamp id there.
pub fn init_bootcamps_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_bootcamps).post(create_bootcamp))
        .route(
            "/{id}",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route("/{id}/photo", put(upload_bootcamp_photo))
        .nest("/{id}/courses", init_bootcamp_courses_router())
        .nest("/{id}/reviews", init_bootcamp_reviews_router())
}
