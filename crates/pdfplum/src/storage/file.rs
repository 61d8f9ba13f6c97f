use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{BlobStorage, StorageError, validate_location};
use crate::paths::normalize_relative;

/// File-based storage implementation
///
/// Objects are laid out as `<base_path>/<bucket>/<key>`, the same shape the
/// storage emulators use on disk, so a directory of zipped templates can be
/// served without running an object store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base path
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Resolve the on-disk path of an object, refusing keys that leave the bucket
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        validate_location(bucket, key)?;

        let relative = normalize_relative(key)
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| StorageError::InvalidKey(format!("Key escapes bucket: {}", key)))?;

        Ok(self.base_path.join(bucket).join(relative))
    }
}

fn map_io_error(key: &str, error: std::io::Error) -> StorageError {
    match error.kind() {
        // A file where the key expects a folder means the object is missing
        ErrorKind::NotFound | ErrorKind::NotADirectory => StorageError::NotFound(key.to_string()),
        ErrorKind::PermissionDenied => StorageError::AccessDenied(key.to_string()),
        _ => StorageError::Backend(format!("Failed to access '{}': {}", key, error)),
    }
}

#[async_trait]
impl BlobStorage for FileStorage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(bucket, key)?;

        // A directory named like the key is not an object
        if fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        fs::read(&path).await.map_err(|e| map_io_error(key, e))
    }

    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io_error(key, e))?;
        }

        fs::write(&path, data).await.map_err(|e| map_io_error(key, e))
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(bucket, key)?;

        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) => match map_io_error(key, e) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_storage() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage
            .put("templates", "reports/monthly.zip", b"zip bytes".to_vec())
            .await
            .unwrap();

        let on_disk = temp_dir.path().join("templates/reports/monthly.zip");
        assert!(on_disk.is_file());

        let data = storage.get("templates", "reports/monthly.zip").await.unwrap();
        assert_eq!(data, b"zip bytes");

        assert!(storage.exists("templates", "reports/monthly.zip").await.unwrap());
        assert!(!storage.exists("templates", "reports/missing.zip").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_storage_not_found() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        match storage.get("templates", "invoice").await {
            Err(StorageError::NotFound(key)) => assert_eq!(key, "invoice"),
            other => panic!("Expected NotFound error, got {:?}", other),
        }

        // Directories are not objects
        std::fs::create_dir_all(temp_dir.path().join("templates/reports")).unwrap();
        assert!(matches!(
            storage.get("templates", "reports").await,
            Err(StorageError::NotFound(_))
        ));

        // Keys below an existing object are missing, not broken
        storage
            .put("templates", "tpl", b"zip bytes".to_vec())
            .await
            .unwrap();
        match storage.get("templates", "tpl/inner").await {
            Err(StorageError::NotFound(key)) => assert_eq!(key, "tpl/inner"),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
        assert!(!storage.exists("templates", "tpl/inner").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_storage_rejects_escaping_keys() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("root"));

        let result = storage.put("templates", "../../outside", b"x".to_vec()).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(!temp_dir.path().join("outside").exists());
    }
}
