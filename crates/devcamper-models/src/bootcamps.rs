//! Bootcamp models and DTOs.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use devcamper_core::listing::{Field, FieldKind, Relation, ResourceSchema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Careers a bootcamp may advertise.
pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Bootcamp {
    pub id: Uuid,
    /// Owner of the bootcamp
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    /// Mean review rating, recomputed on every review change
    pub average_rating: Option<f64>,
    /// Mean course tuition rounded up to the nearest ten
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateBootcampDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description must be between 1 and 500 characters"
    ))]
    pub description: String,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: String,
    #[validate(custom(function = "validate_careers"))]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

/// Partial update; absent fields keep their value.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateBootcampDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description must be between 1 and 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,
    #[validate(custom(function = "validate_careers"))]
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

#[allow(clippy::ptr_arg)]
fn validate_careers(careers: &Vec<String>) -> Result<(), ValidationError> {
    if careers.is_empty() {
        return Err(ValidationError::new("careers")
            .with_message(Cow::from("Please add at least one career")));
    }
    if let Some(unknown) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
        return Err(ValidationError::new("careers")
            .with_message(Cow::from(format!("'{}' is not a supported career", unknown))));
    }
    Ok(())
}

/// URL-friendly form of a bootcamp name: lowercase ASCII words joined by `-`.
pub fn generate_slug(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub static BOOTCAMP_LISTING: ResourceSchema = ResourceSchema {
    table: "bootcamps",
    fields: &[
        Field::new("id", FieldKind::Uuid),
        Field::new("user_id", FieldKind::Uuid),
        Field::new("name", FieldKind::Text),
        Field::new("slug", FieldKind::Text),
        Field::new("description", FieldKind::Text),
        Field::new("website", FieldKind::Text),
        Field::new("phone", FieldKind::Text),
        Field::new("email", FieldKind::Text),
        Field::new("address", FieldKind::Text),
        Field::new("careers", FieldKind::TextArray),
        Field::new("average_rating", FieldKind::Float),
        Field::new("average_cost", FieldKind::Float),
        Field::new("photo", FieldKind::Text),
        Field::new("housing", FieldKind::Boolean),
        Field::new("job_assistance", FieldKind::Boolean),
        Field::new("job_guarantee", FieldKind::Boolean),
        Field::new("accept_gi", FieldKind::Boolean),
        Field::new("created_at", FieldKind::Timestamp),
        Field::new("updated_at", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "courses",
        sql: "(SELECT COALESCE(jsonb_agg(to_jsonb(c) ORDER BY c.created_at), '[]'::jsonb) \
              FROM courses c WHERE c.bootcamp_id = t.id)",
    }],
};
