//! Course models and DTOs.

use chrono::{DateTime, Utc};
use devcamper_core::listing::{Field, FieldKind, Relation, ResourceSchema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "skill_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const NAMES: &'static [&'static str] = &["beginner", "intermediate", "advanced"];
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    /// Publisher who created the course
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub tuition: f64,
    pub minimum_skill: SkillLevel,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: String,
    #[validate(range(min = 1, message = "Please add number of weeks"))]
    pub weeks: i32,
    #[validate(range(min = 0.0, message = "Please add a tuition cost"))]
    pub tuition: f64,
    pub minimum_skill: SkillLevel,
    #[serde(default)]
    pub scholarship_available: bool,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Please add number of weeks"))]
    pub weeks: Option<i32>,
    #[validate(range(min = 0.0, message = "Please add a tuition cost"))]
    pub tuition: Option<f64>,
    pub minimum_skill: Option<SkillLevel>,
    pub scholarship_available: Option<bool>,
}

/// Summary of the owning bootcamp embedded into listed courses and reviews.
pub(crate) const BOOTCAMP_SUMMARY_SQL: &str =
    "(SELECT jsonb_build_object('id', b.id, 'name', b.name, 'description', b.description) \
     FROM bootcamps b WHERE b.id = t.bootcamp_id)";

pub static COURSE_LISTING: ResourceSchema = ResourceSchema {
    table: "courses",
    fields: &[
        Field::new("id", FieldKind::Uuid),
        Field::new("bootcamp_id", FieldKind::Uuid),
        Field::new("user_id", FieldKind::Uuid),
        Field::new("title", FieldKind::Text),
        Field::new("description", FieldKind::Text),
        Field::new("weeks", FieldKind::Integer),
        Field::new("tuition", FieldKind::Float),
        Field::new("minimum_skill", FieldKind::Enum(SkillLevel::NAMES)),
        Field::new("scholarship_available", FieldKind::Boolean),
        Field::new("created_at", FieldKind::Timestamp),
        Field::new("updated_at", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "bootcamp",
        sql: BOOTCAMP_SUMMARY_SQL,
    }],
};
