mod common;

use axum::http::{StatusCode, header};
use common::{body_json, empty_request, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_health(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_route_uses_error_envelope(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/nothing-here", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route /api/v1/nothing-here not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unsupported_method_uses_error_envelope(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("PATCH", "/api/v1/bootcamps", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Method PATCH not allowed on /api/v1/bootcamps");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_responses_carry_request_id(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/bootcamps", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_security_headers_are_set(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_openapi_document_is_served(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/v1/bootcamps"].is_object());
}
