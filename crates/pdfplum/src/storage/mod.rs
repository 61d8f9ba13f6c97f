//! Object storage abstraction for template archives
//!
//! Templates live in buckets of an object store and are addressed by
//! `(bucket, key)`. Backends only need to tell a missing object apart from
//! every other failure; the materializer relies on that to decide whether the
//! `.zip` suffixed fallback key is worth a second request.

mod file;
mod memory;
#[cfg(feature = "s3")]
mod s3;

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// HTTP-style status code for the conditions that have one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StorageError::NotFound(_) => Some(404),
            StorageError::AccessDenied(_) => Some(403),
            StorageError::InvalidKey(_) => Some(400),
            StorageError::Backend(_) => None,
        }
    }
}

/// Abstraction for bucketed blob storage backends
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Retrieve the object stored under `key` in `bucket`
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store data under `key` in `bucket`
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), StorageError>;

    /// Check if an object exists
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError>;
}

/// Validate bucket and key names shared by every backend
pub(crate) fn validate_location(bucket: &str, key: &str) -> Result<(), StorageError> {
    if bucket.is_empty() || bucket.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "Invalid bucket name '{}'",
            bucket
        )));
    }

    if key.is_empty() || key.len() > 1024 {
        return Err(StorageError::InvalidKey(
            "Key must be between 1 and 1024 characters".into(),
        ));
    }

    if key.starts_with('/') || key.ends_with('/') {
        return Err(StorageError::InvalidKey(
            "Key cannot start or end with '/'".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validation() {
        assert!(validate_location("templates", "invoice.zip").is_ok());
        assert!(validate_location("templates", "nested/dir/invoice").is_ok());

        assert!(validate_location("", "invoice").is_err());
        assert!(validate_location("a/b", "invoice").is_err());
        assert!(validate_location("templates", "").is_err());
        assert!(validate_location("templates", "/invoice").is_err());
        assert!(validate_location("templates", "invoice/").is_err());
        assert!(validate_location("templates", &"x".repeat(1025)).is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StorageError::NotFound("k".into()).status_code(), Some(404));
        assert_eq!(StorageError::AccessDenied("k".into()).status_code(), Some(403));
        assert_eq!(StorageError::Backend("boom".into()).status_code(), None);
    }
}
