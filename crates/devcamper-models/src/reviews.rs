//! Review models and DTOs.

use chrono::{DateTime, Utc};
use devcamper_core::listing::{Field, FieldKind, Relation, ResourceSchema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::courses::BOOTCAMP_SUMMARY_SQL;

/// A review of a bootcamp. Each user reviews a bootcamp at most once.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateReviewDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please add a title for the review (at most 100 characters)"
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: i32,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateReviewDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please add a title for the review (at most 100 characters)"
    ))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: Option<i32>,
}

pub static REVIEW_LISTING: ResourceSchema = ResourceSchema {
    table: "reviews",
    fields: &[
        Field::new("id", FieldKind::Uuid),
        Field::new("bootcamp_id", FieldKind::Uuid),
        Field::new("user_id", FieldKind::Uuid),
        Field::new("title", FieldKind::Text),
        Field::new("text", FieldKind::Text),
        Field::new("rating", FieldKind::Integer),
        Field::new("created_at", FieldKind::Timestamp),
        Field::new("updated_at", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "bootcamp",
        sql: BOOTCAMP_SUMMARY_SQL,
    }],
};
