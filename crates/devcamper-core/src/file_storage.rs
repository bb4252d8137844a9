//! File storage abstraction for uploaded bootcamp photos.
//!
//! Uploads go through [`check_image_upload`] before anything touches the
//! disk, then through a [`FileStorage`] backend. The only backend shipped is
//! [`LocalFileStorage`], which writes below a base directory that the router
//! also serves statically.
//!
//! # Example
//!
//! ```ignore
//! use devcamper_core::file_storage::{FileStorage, LocalFileStorage, check_image_upload};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./public/uploads"), "/uploads".to_string());
//!
//! check_image_upload("image/png", bytes.len(), 1_000_000)?;
//! let key = storage.save("photo_1b4e28ba.png", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::anyhow;
use thiserror::Error;
use tokio::fs;

use crate::errors::AppError;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Storage backend for uploaded files.
pub trait FileStorage: Send + Sync {
    /// Saves `content` under `key`, replacing any existing file, and returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Deletes a file. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL under which a stored file is served.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Please upload an image less than {max_bytes}")]
    InvalidFileSize { max_bytes: usize },

    #[error("Please upload an image file")]
    InvalidMimeType { received: String },

    #[error("Problem with file upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileSize { .. } | StorageError::InvalidMimeType { .. } => {
                AppError::bad_request(anyhow!(err.to_string()))
            }
            StorageError::InvalidKey(_) | StorageError::Io(_) => AppError::internal(err),
        }
    }
}

/// Rejects uploads whose content type is not an image or whose size exceeds
/// `max_bytes`. The content type check runs first.
pub fn check_image_upload(
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), StorageError> {
    if !content_type.starts_with("image") {
        return Err(StorageError::InvalidMimeType {
            received: content_type.to_string(),
        });
    }
    if size > max_bytes {
        return Err(StorageError::InvalidFileSize { max_bytes });
    }
    Ok(())
}

/// File extension of an uploaded file name, including the leading dot.
///
/// Returns an empty string when the name has no usable extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Local filesystem storage.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self { base_dir, base_url }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Keys are flat file names; anything that could escape `base_dir` is rejected.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with(['/', '\\']) {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            fs::create_dir_all(&self.base_dir).await?;
            fs::write(self.base_dir.join(key), content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_photo_names() {
        assert!(LocalFileStorage::validate_key("photo_5d725a1b.jpg").is_ok());
        assert!(LocalFileStorage::validate_key("no-photo.jpg").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_traversal_and_nesting() {
        assert!(LocalFileStorage::validate_key("").is_err());
        assert!(LocalFileStorage::validate_key("../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows").is_err());
        assert!(LocalFileStorage::validate_key("nested/photo.jpg").is_err());
        assert!(LocalFileStorage::validate_key("photo 1.jpg").is_err());
    }

    #[test]
    fn test_check_image_upload() {
        assert!(check_image_upload("image/png", 10, 100).is_ok());
        assert!(check_image_upload("image/jpeg", 100, 100).is_ok());

        let err = check_image_upload("text/plain", 10, 100).unwrap_err();
        assert_eq!(err.to_string(), "Please upload an image file");

        let err = check_image_upload("image/png", 101, 100).unwrap_err();
        assert_eq!(err.to_string(), "Please upload an image less than 100");
    }

    #[test]
    fn test_mime_is_checked_before_size() {
        assert!(matches!(
            check_image_upload("application/pdf", 10_000, 100),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn test_upload_errors_map_to_bad_request() {
        let err = AppError::from(StorageError::InvalidMimeType {
            received: "text/plain".to_string(),
        });
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = AppError::from(StorageError::InvalidKey("x".to_string()));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("campus.JPG"), ".jpg");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("evil.p/hp"), "");
    }

    #[test]
    fn test_get_url_handles_trailing_slash() {
        let storage = LocalFileStorage::new(PathBuf::from("./uploads"), "/uploads/".to_string());
        assert_eq!(storage.get_url("photo_1.png").unwrap(), "/uploads/photo_1.png");
    }

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"), "/uploads".to_string());

        let key = storage.save("photo_1.png", b"png").await.unwrap();
        assert_eq!(tokio::fs::read(dir.path().join("uploads").join(&key)).await.unwrap(), b"png");

        storage.delete(&key).await.unwrap();
        assert!(!dir.path().join("uploads").join(&key).exists());

        // deleting twice is fine
        storage.delete(&key).await.unwrap();
    }
}
