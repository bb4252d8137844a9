//! Ownership policy for mutable resources.
//!
//! A caller may mutate a bootcamp, course or review iff they own it or are
//! an admin. Every handler that mutates an owned resource goes through
//! [`authorize_owner`].

use std::fmt;

use uuid::Uuid;

use devcamper_core::AppError;
use devcamper_models::{Bootcamp, Course, Review};

use crate::middleware::auth::AuthUser;

/// A resource with a single owning user.
pub trait Owned {
    /// Noun used in authorization messages.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

impl Owned for Bootcamp {
    const KIND: &'static str = "bootcamp";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Course {
    const KIND: &'static str = "course";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Review {
    const KIND: &'static str = "review";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
    UploadPhoto,
    AddCourse,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Delete => "delete",
            Self::UploadPhoto => "upload a photo for",
            Self::AddCourse => "add a course to",
        })
    }
}

pub fn is_owner_or_admin<T: Owned>(auth_user: &AuthUser, resource: &T) -> bool {
    auth_user.is_admin() || resource.owner_id() == auth_user.id()
}

/// Fails with 403 unless the caller owns `resource` or is an admin.
pub fn authorize_owner<T: Owned>(
    auth_user: &AuthUser,
    resource: &T,
    action: Action,
) -> Result<(), AppError> {
    if is_owner_or_admin(auth_user, resource) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %auth_user.id(),
        resource = T::KIND,
        resource_id = %resource.id(),
        action = %action,
        "Ownership check failed"
    );

    Err(AppError::forbidden(format!(
        "User {} is not authorized to {} {} {}",
        auth_user.id(),
        action,
        T::KIND,
        resource.id()
    )))
}
