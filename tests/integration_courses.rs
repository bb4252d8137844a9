mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_bootcamp, create_test_user, empty_request, json_request,
    setup_test_app,
};
use devcamper_models::Role;
use serde_json::json;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

fn course_body(title: &str, tuition: f64) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Learn the fundamentals",
        "weeks": 8,
        "tuition": tuition,
        "minimum_skill": "beginner",
        "scholarship_available": false
    })
}

async fn average_cost(pool: &PgPool, bootcamp_id: Uuid) -> Option<f64> {
    sqlx::query_scalar("SELECT average_cost FROM bootcamps WHERE id = $1")
        .bind(bootcamp_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_course_updates_average_cost(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp_id);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            &uri,
            Some(&owner.token),
            course_body("Front End", 8000.0),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["bootcamp_id"], bootcamp_id.to_string());
    assert_eq!(body["data"]["user_id"], owner.id.to_string());
    let first_course = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            &uri,
            Some(&owner.token),
            course_body("Back End", 10005.0),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // mean 9002.5, rounded up to the next ten
    assert_eq!(average_cost(&pool, bootcamp_id).await, Some(9010.0));

    let response = app
        .router
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/courses/{}", first_course),
            Some(&owner.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(average_cost(&pool, bootcamp_id).await, Some(10010.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_courses_keep_average_cost_exact(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool.clone());
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp_id);

    let mut tasks = JoinSet::new();
    for i in 1..=8 {
        let router = app.router.clone();
        let request = json_request(
            "POST",
            &uri,
            Some(&owner.token),
            course_body(&format!("Course {}", i), f64::from(i) * 1000.0),
        );
        tasks.spawn(async move { router.oneshot(request).await.unwrap().status() });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::CREATED);
    }

    // mean 4500 is already a multiple of ten
    assert_eq!(average_cost(&pool, bootcamp_id).await, Some(4500.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_course_to_missing_bootcamp(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/bootcamps/{}/courses", Uuid::new_v4()),
            Some(&owner.token),
            course_body("Front End", 8000.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_course_to_someone_elses_bootcamp(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let other = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/bootcamps/{}/courses", bootcamp_id),
            Some(&other.token),
            course_body("Front End", 8000.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_course_rejects_unknown_skill(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let app = setup_test_app(pool);

    let mut body = course_body("Front End", 8000.0);
    body["minimum_skill"] = json!("expert");
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/bootcamps/{}/courses", bootcamp_id),
            Some(&owner.token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_nested_listing_is_scoped_to_bootcamp(pool: PgPool) {
    let first_owner = create_test_user(&pool, Role::Publisher).await;
    let second_owner = create_test_user(&pool, Role::Publisher).await;
    let first = create_test_bootcamp(&pool, first_owner.id, "First Camp").await;
    let second = create_test_bootcamp(&pool, second_owner.id, "Second Camp").await;
    for (bootcamp, owner, title) in [
        (first, first_owner.id, "Alpha"),
        (first, first_owner.id, "Beta"),
        (second, second_owner.id, "Gamma"),
    ] {
        sqlx::query(
            "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill) \
             VALUES ($1, $2, $3, 'Course', 6, 5000, 'intermediate')",
        )
        .bind(bootcamp)
        .bind(owner)
        .bind(title)
        .execute(&pool)
        .await
        .unwrap();
    }
    let app = setup_test_app(pool);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/bootcamps/{}/courses?sort=title", first),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"][0]["title"], "Alpha");
    assert_eq!(body["data"][1]["title"], "Beta");

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/courses?minimum_skill=intermediate", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert!(body["data"][0]["bootcamp"]["name"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_course_embeds_bootcamp(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let course_id: Uuid = sqlx::query_scalar(
        "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill) \
         VALUES ($1, $2, 'Front End', 'HTML', 8, 8000, 'beginner') RETURNING id",
    )
    .bind(bootcamp_id)
    .bind(owner.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("/api/v1/courses/{}", course_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Front End");
    assert_eq!(body["data"]["bootcamp"]["name"], "Devworks Bootcamp");

    let response = app
        .router
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/courses/{}", Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_course_by_non_owner_is_forbidden(pool: PgPool) {
    let owner = create_test_user(&pool, Role::Publisher).await;
    let other = create_test_user(&pool, Role::Publisher).await;
    let bootcamp_id = create_test_bootcamp(&pool, owner.id, "Devworks Bootcamp").await;
    let course_id: Uuid = sqlx::query_scalar(
        "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill) \
         VALUES ($1, $2, 'Front End', 'HTML', 8, 8000, 'beginner') RETURNING id",
    )
    .bind(bootcamp_id)
    .bind(owner.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool.clone());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/courses/{}", course_id),
            Some(&other.token),
            json!({ "tuition": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/courses/{}", course_id),
            Some(&owner.token),
            json!({ "tuition": 12000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(average_cost(&pool, bootcamp_id).await, Some(12000.0));
}
