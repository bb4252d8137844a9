//! Request logging and subscriber setup.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

pub const LOG_DIR: &str = "storage/logs";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Slot the logging middleware places in the request extensions. The
/// `AuthUser` extractor fills it once the caller is known, so the completion
/// line can name the user even though the handler consumed the request.
#[derive(Debug, Clone, Default)]
pub struct RequestUser(Arc<OnceLock<Uuid>>);

impl RequestUser {
    /// Records the caller. The first id recorded for a request is kept.
    pub fn set(&self, user_id: Uuid) {
        self.0.get_or_init(|| user_id);
    }

    pub fn get(&self) -> Option<Uuid> {
        self.0.get().copied()
    }
}

/// Runs the request inside a span carrying its id, method and route, then
/// logs the outcome at a level chosen by status class. The id is echoed in
/// the `x-request-id` response header.
pub async fn logging_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %path,
    );

    let user = RequestUser::default();
    req.extensions_mut().insert(user.clone());

    let mut response = next.run(req).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis();
    let user_id = user.get().map_or_else(|| "-".to_string(), |id| id.to_string());

    span.in_scope(|| match status {
        500..=599 => error!(status, latency_ms = %latency_ms, %user_id, "Server error"),
        400..=499 => warn!(status, latency_ms = %latency_ms, %user_id, "Client error"),
        _ => info!(status, latency_ms = %latency_ms, %user_id, "Request completed"),
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Installs the global subscriber: a compact console layer filtered by
/// `RUST_LOG`, a daily error log and a daily JSON log under [`LOG_DIR`].
///
/// If the log directory cannot be created only the console layer is
/// installed.
pub fn init_tracing() {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,devcamper_db=info,tower_http=warn,sqlx=warn",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        tracing_subscriber::registry().with(console_layer).init();
        warn!(error = %e, dir = LOG_DIR, "Log directory unavailable, logging to console only");
        return;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "devcamper.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    // structured logs for ingestion
    let json_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "devcamper.json");

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    info!("Tracing initialized with console and file logging");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_request_user_keeps_first_id() {
        let user = RequestUser::default();
        assert_eq!(user.get(), None);

        let first = Uuid::new_v4();
        user.clone().set(first);
        user.set(Uuid::new_v4());
        assert_eq!(user.get(), Some(first));
    }

    #[tokio::test]
    async fn test_middleware_provides_user_slot_and_request_id() {
        let user_id = Uuid::new_v4();
        let app = Router::new()
            .route(
                "/me",
                get(move |Extension(user): Extension<RequestUser>| async move {
                    user.set(user_id);
                    StatusCode::OK
                }),
            )
            .layer(middleware::from_fn(logging_middleware));

        let response = app
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(request_id).is_ok());
    }
}
