//! Application error type and its HTTP mapping.
//!
//! Every failure in a request ends up as an [`AppError`]. The error carries an
//! [`ErrorKind`] that fixes the HTTP status, and an [`anyhow::Error`] with the
//! message returned to the caller. Internal errors are logged and replaced by
//! a generic message before they leave the process.
//!
//! Store errors are classified in one place, the `From<sqlx::Error>`
//! conversion, so services can use `?` on queries without mapping each
//! failure by hand:
//!
//! | sqlx error | kind |
//! |------------|------|
//! | `RowNotFound` | [`ErrorKind::NotFound`] |
//! | unique violation | [`ErrorKind::DuplicateKey`] |
//! | check / foreign key / not-null violation | [`ErrorKind::Validation`] |
//! | invalid text representation (`22P02`) | [`ErrorKind::NotFound`] |
//! | anything else | [`ErrorKind::Internal`] |
//!
//! # Example
//!
//! ```ignore
//! use devcamper_core::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Bootcamp not found with id of {}", id));
//! ```

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

/// Message sent to clients for every internal error.
pub const GENERIC_SERVER_ERROR: &str = "Server Error";

/// Error taxonomy of the API. Each kind maps to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or value.
    Validation,
    /// Missing resource or malformed identifier.
    NotFound,
    /// Missing, malformed or expired session token.
    NotAuthenticated,
    /// Authenticated caller lacks the role or ownership required.
    NotAuthorized,
    /// Unique constraint violated.
    DuplicateKey,
    /// Known route, unsupported HTTP method.
    MethodNotAllowed,
    /// Anything unexpected.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation | Self::DuplicateKey => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::NotAuthorized => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn duplicate_key<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::DuplicateKey, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(ErrorKind::NotAuthenticated, anyhow!(message))
    }

    pub fn forbidden(message: String) -> Self {
        Self::new(ErrorKind::NotAuthorized, anyhow!(message))
    }

    pub fn method_not_allowed(message: String) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, anyhow!(message))
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(ErrorKind::Internal, anyhow!(message))
    }

    /// Message as it will be shown to the caller.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => GENERIC_SERVER_ERROR.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "Unhandled server error");
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::not_found(anyhow!("Resource not found")),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::duplicate_key(anyhow!("Duplicate field value entered"));
                }
                if db_err.is_check_violation() || db_err.is_foreign_key_violation() {
                    let constraint = db_err.constraint().unwrap_or("constraint");
                    return Self::bad_request(anyhow!("Invalid value: violates {}", constraint));
                }
                match db_err.code().as_deref() {
                    // not_null_violation
                    Some("23502") => Self::bad_request(anyhow!("Missing required field")),
                    // invalid_text_representation
                    Some("22P02") => Self::not_found(anyhow!("Resource not found")),
                    _ => Self::internal(err),
                }
            }
            _ => Self::internal(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(anyhow!("{}", format_validation_errors(&errors)))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

/// Joins every field message into one comma-separated string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
