//! Server configuration management

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};

/// Which object store templates are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `<STORAGE_ROOT>/<bucket>/<key>` on local disk
    File,
    /// S3-compatible endpoint configured through `S3_*` variables
    S3,
}

impl FromStr for StorageBackend {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" | "fs" => Ok(StorageBackend::File),
            "s3" => Ok(StorageBackend::S3),
            other => Err(ApiError::Config(format!(
                "Invalid STORAGE_BACKEND value '{}'",
                other
            ))),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Where templates are stored
    pub storage_backend: StorageBackend,

    /// Root directory of the file storage backend
    pub storage_root: PathBuf,

    /// Template used when a request does not name one (`bucket/prefix/id`)
    pub template_path: Option<String>,

    /// Parent directory for materialized templates
    pub temp_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid PORT value".to_string()))?,
            storage_backend: std::env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "file".to_string())
                .parse()?,
            storage_root: std::env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./storage")),
            template_path: std::env::var("TEMPLATE_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            temp_dir: std::env::var("TEMPLATE_TMP_DIR").ok().map(PathBuf::from),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage_backend: StorageBackend::File,
            storage_root: PathBuf::from("./storage"),
            template_path: None,
            temp_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("file".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!(" S3 ".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert!("gcs".parse::<StorageBackend>().is_err());
    }
}
