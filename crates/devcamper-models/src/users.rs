//! User models and roles.

use std::fmt;

use chrono::{DateTime, Utc};
use devcamper_core::listing::{Field, FieldKind, ResourceSchema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role of a user account.
///
/// - `user` may write reviews
/// - `publisher` may own and manage one bootcamp and its courses
/// - `admin` may do anything, including managing users
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["user", "publisher", "admin"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Publisher => "publisher",
            Self::Admin => "admin",
        }
    }

    /// Roles a caller may pick for themselves when registering.
    pub fn is_self_assignable(self) -> bool {
        matches!(self, Self::User | Self::Publisher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account. The password hash and reset token live in the same row
/// but are never part of this type.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Password hash of a user, loaded only to check credentials.
#[derive(FromRow, Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Listable user fields. Credentials and reset tokens are not listed.
pub static USER_LISTING: ResourceSchema = ResourceSchema {
    table: "users",
    fields: &[
        Field::new("id", FieldKind::Uuid),
        Field::new("name", FieldKind::Text),
        Field::new("email", FieldKind::Text),
        Field::new("role", FieldKind::Enum(Role::NAMES)),
        Field::new("created_at", FieldKind::Timestamp),
        Field::new("updated_at", FieldKind::Timestamp),
    ],
    relations: &[],
};
