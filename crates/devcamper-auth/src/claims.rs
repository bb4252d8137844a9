use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use devcamper_core::AppError;

/// Claims of a session token.
///
/// The token only identifies the user; role and ownership are resolved from
/// the database on each request, so a role change takes effect immediately.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::unauthorized("Not authorized to access this route".to_string()))
    }
}
