mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    body_json, create_test_bootcamp, create_test_user, empty_request, json_request,
    setup_test_app,
};
use devcamper::modules::bootcamps::service::{BootcampService, PhotoUpload};
use devcamper_models::Role;
use serde_json::{Value, json};
use sqlx::PgPool;
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "devcamper-test-boundary";

fn bootcamp_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development bootcamp",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "job_assistance": true
    })
}

fn photo_request(bootcamp_id: Uuid, token: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"campus.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/bootcamps/{}/photo", bootcamp_id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

async fn stored_photo(pool: &PgPool, id: Uuid) -> String {
    sqlx::query_scalar("SELECT photo FROM bootcamps WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_bootcamps_is_public(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    create_test_bootcamp(&pool, publisher.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/bootcamps", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Devworks Bootcamp");
    assert_eq!(body["data"][0]["courses"], json!([]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pagination_second_page(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    for i in 0..25 {
        create_test_bootcamp(&pool, publisher.id, &format!("Bootcamp {:02}", i)).await;
    }
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request(
            "GET",
            "/api/v1/bootcamps?page=2&limit=10&sort=name",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 10);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["previous"], json!({ "page": 1, "limit": 10 }));
    assert_eq!(body["pagination"]["next"], json!({ "page": 3, "limit": 10 }));
    assert_eq!(body["data"][0]["name"], "Bootcamp 10");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_huge_page_returns_empty_data(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    create_test_bootcamp(&pool, publisher.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request(
            "GET",
            "/api/v1/bootcamps?page=9223372036854775807&limit=10",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 1);
    assert!(body["pagination"].get("next").is_none());
    assert_eq!(body["pagination"]["previous"]["limit"], 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_and_select(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    let cheap = create_test_bootcamp(&pool, publisher.id, "Cheap Camp").await;
    let pricey = create_test_bootcamp(&pool, publisher.id, "Pricey Camp").await;
    for (id, cost) in [(cheap, 8000.0_f64), (pricey, 15000.0)] {
        sqlx::query("UPDATE bootcamps SET average_cost = $2 WHERE id = $1")
            .bind(id)
            .bind(cost)
            .execute(&pool)
            .await
            .unwrap();
    }
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request(
            "GET",
            "/api/v1/bootcamps?average_cost%5Blte%5D=10000&select=name,average_cost",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    let doc = &body["data"][0];
    assert_eq!(doc["name"], "Cheap Camp");
    assert_eq!(doc["average_cost"], 8000.0);
    assert_eq!(doc["id"], cheap.to_string());
    assert!(doc.get("description").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_filter_field_is_bad_request(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/bootcamps?password=x", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_bootcamp_not_found_and_malformed_id(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/bootcamps/{}", Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/bootcamps/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Resource not found with id of not-a-uuid");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_bootcamp_requires_auth(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/v1/bootcamps",
            None,
            bootcamp_body("Devworks Bootcamp"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_bootcamp_requires_publisher_role(pool: PgPool) {
    let user = create_test_user(&pool, Role::User).await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/v1/bootcamps",
            Some(&user.token),
            bootcamp_body("Devworks Bootcamp"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User role user is not authorized to access this route");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publisher_creates_one_bootcamp(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/bootcamps",
            Some(&publisher.token),
            bootcamp_body("Devworks Bootcamp"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["slug"], "devworks-bootcamp");
    assert_eq!(body["data"]["user_id"], publisher.id.to_string());
    assert_eq!(body["data"]["photo"], "no-photo.jpg");

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/v1/bootcamps",
            Some(&publisher.token),
            bootcamp_body("Second Bootcamp"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        format!(
            "The user with ID {} has already published a bootcamp",
            publisher.id
        )
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_creates_by_one_publisher(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    let app = setup_test_app(pool.clone());

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let router = app.router.clone();
        let request = json_request(
            "POST",
            "/api/v1/bootcamps",
            Some(&publisher.token),
            bootcamp_body(&format!("Bootcamp {}", i)),
        );
        tasks.spawn(async move { router.oneshot(request).await.unwrap().status() });
    }

    let mut created = 0;
    while let Some(status) = tasks.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::BAD_REQUEST),
        }
    }
    assert_eq!(created, 1);

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bootcamps WHERE user_id = $1")
        .bind(publisher.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(owned, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_bootcamp_rejects_unknown_career(pool: PgPool) {
    let publisher = create_test_user(&pool, Role::Publisher).await;
    let app = setup_test_app(pool);

    let mut body = bootcamp_body("Devworks Bootcamp");
    body["careers"] = json!(["Underwater Basket Weaving"]);
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/v1/bootcamps",
            Some(&publisher.token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_owner_cannot_update_or_delete(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let other = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/bootcamps/{}", id),
            Some(&other.token),
            json!({ "name": "Hijacked" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/bootcamps/{}", id),
            Some(&other.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let name: String = sqlx::query_scalar("SELECT name FROM bootcamps WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Devworks Bootcamp");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_can_update_any_bootcamp(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let admin = create_test_user(&pool, Role::Admin).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/bootcamps/{}", id),
            Some(&admin.token),
            json!({ "name": "Codemasters", "housing": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Codemasters");
    assert_eq!(body["data"]["slug"], "codemasters");
    assert_eq!(body["data"]["housing"], true);
    // ownership is not transferred
    assert_eq!(body["data"]["user_id"], owner.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_bootcamp_cascades(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    sqlx::query(
        "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill) \
         VALUES ($1, $2, 'Front End', 'HTML and CSS', 8, 8000, 'beginner')",
    )
    .bind(id)
    .bind(owner.id)
    .execute(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/bootcamps/{}", id),
            Some(&owner.token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!({}));

    let courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE bootcamp_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(courses, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_upload_rejects_non_image(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .oneshot(photo_request(id, &owner.token, "text/plain", b"not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please upload an image file");
    assert_eq!(stored_photo(&pool, id).await, "no-photo.jpg");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_upload_rejects_large_file(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .oneshot(photo_request(id, &owner.token, "image/png", &[0u8; 2048]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please upload an image less than 1024");
    assert_eq!(stored_photo(&pool, id).await, "no-photo.jpg");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_upload_requires_file(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(empty_request(
            "PUT",
            &format!("/api/v1/bootcamps/{}/photo", id),
            Some(&owner.token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please upload a file");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_upload_by_non_owner_is_forbidden(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let other = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(photo_request(id, &other.token, "image/png", b"png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_upload_stores_and_serves_file(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .clone()
        .oneshot(photo_request(id, &owner.token, "image/png", b"fake png bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let file_name = format!("photo_{}.png", id);
    assert_eq!(body["data"], file_name);
    assert_eq!(stored_photo(&pool, id).await, file_name);
    assert!(app.upload_dir.path().join(&file_name).exists());

    let response = app
        .router
        .oneshot(empty_request("GET", &format!("/uploads/{}", file_name), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_photo_for_vanished_bootcamp_is_not_kept(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());
    let file_name = format!("photo_{}.png", id);

    // same name as the upload, so only the vanished row makes it unreferenced
    sqlx::query("UPDATE bootcamps SET photo = $1 WHERE id = $2")
        .bind(&file_name)
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    let bootcamp = BootcampService::get_bootcamp(&pool, id).await.unwrap();

    sqlx::query("DELETE FROM bootcamps WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let upload = PhotoUpload {
        file_name: "campus.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: b"fake png bytes".to_vec(),
    };
    let err = BootcampService::upload_photo(
        &pool,
        &bootcamp,
        upload,
        1024,
        &app.state.photo_storage,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert!(!app.upload_dir.path().join(&file_name).exists());
}
