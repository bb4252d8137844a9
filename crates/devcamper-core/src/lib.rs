//! # DevCamper Core
//!
//! Core types, errors, and utilities shared by the DevCamper API crates.
//!
//! - [`errors`]: the error taxonomy and its JSON envelope
//! - [`listing`]: query-string translation for collection listings
//! - [`pagination`]: page/limit parsing and pagination descriptors
//! - [`password`]: bcrypt hashing and verification
//! - [`file_storage`]: upload checks and the storage backend for photos
//! - [`response`]: the success envelope
//!
//! # Example
//!
//! ```ignore
//! use devcamper_core::errors::AppError;
//! use devcamper_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Bootcamp not found"));
//! let hash = hash_password("123456")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod listing;
pub mod pagination;
pub mod password;
pub mod response;

pub use errors::{AppError, ErrorKind};
pub use listing::{ListingQuery, ListingResponse, ResourceSchema};
pub use password::{hash_password, verify_password};
pub use response::ApiResponse;
