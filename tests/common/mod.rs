#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use devcamper::router::init_router;
use devcamper::state::AppState;
use devcamper_auth::create_token;
use devcamper_config::{AppConfig, CorsConfig, EmailConfig, JwtConfig, UploadConfig};
use devcamper_core::file_storage::LocalFileStorage;
use devcamper_core::hash_password;
use devcamper_models::{Role, generate_slug};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "123456";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// Router plus the temporary upload directory it writes photos to. The
/// directory is removed when this is dropped.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        token_expiry_days: 30,
        cookie_expiry_days: 30,
    }
}

pub fn setup_test_app(pool: PgPool) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let upload_config = UploadConfig {
        max_file_upload: 1024,
        upload_dir: upload_dir.path().to_path_buf(),
        public_path: "/uploads".to_string(),
    };

    let state = AppState {
        db: pool,
        app_config: AppConfig::default(),
        jwt_config: test_jwt_config(),
        email_config: EmailConfig::default(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        photo_storage: LocalFileStorage::new(
            upload_config.upload_dir.clone(),
            upload_config.public_path.clone(),
        ),
        upload_config,
    };

    TestApp {
        router: init_router(state.clone()),
        state,
        upload_dir,
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test User")
    .bind(&email)
    .bind(hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        role,
        token: create_token(id, &test_jwt_config()).unwrap(),
    }
}

pub async fn create_test_bootcamp(pool: &PgPool, owner: Uuid, name: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO bootcamps (user_id, name, slug, description, address, careers) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(owner)
    .bind(name)
    .bind(generate_slug(name))
    .bind("A test bootcamp")
    .bind("233 Bay State Rd Boston MA 02215")
    .bind(vec!["Web Development".to_string()])
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
