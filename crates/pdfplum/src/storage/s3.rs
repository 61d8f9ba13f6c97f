//! S3-compatible storage implementation using MinIO client
//!
//! Works with AWS S3, MinIO, Google Cloud Storage's XML interoperability
//! endpoint and any other S3-compatible object store.

use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::{
    client::Client, creds::StaticProvider, http::BaseUrl, segmented_bytes::SegmentedBytes,
    types::S3Api,
};
use std::str::FromStr;

use super::{BlobStorage, StorageError, validate_location};

/// S3-compatible storage implementation using MinIO client
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create S3 storage from environment variables
    ///
    /// Expects:
    /// - S3_ACCESS_KEY_ID
    /// - S3_SECRET_ACCESS_KEY
    /// - S3_ENDPOINT_URL
    pub fn from_env() -> Result<Self, StorageError> {
        let access_key = std::env::var("S3_ACCESS_KEY_ID").map_err(|_| {
            StorageError::Backend("S3_ACCESS_KEY_ID environment variable not set".to_string())
        })?;

        let secret_key = std::env::var("S3_SECRET_ACCESS_KEY").map_err(|_| {
            StorageError::Backend("S3_SECRET_ACCESS_KEY environment variable not set".to_string())
        })?;

        let endpoint_url = std::env::var("S3_ENDPOINT_URL").map_err(|_| {
            StorageError::Backend("S3_ENDPOINT_URL environment variable not set".to_string())
        })?;

        let base_url = BaseUrl::from_str(&endpoint_url)
            .map_err(|e| StorageError::Backend(format!("Invalid S3_ENDPOINT_URL: {}", e)))?;

        let creds_provider = StaticProvider::new(&access_key, &secret_key, None);

        let client = Client::new(base_url, Some(Box::new(creds_provider)), None, None)
            .map_err(|e| StorageError::Backend(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self::new(client))
    }
}

fn is_missing(message: &str) -> bool {
    message.contains("NoSuchKey") || message.contains("NoSuchBucket") || message.contains("404")
}

#[async_trait]
impl BlobStorage for S3Storage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_location(bucket, key)?;

        let response = self
            .client
            .get_object(bucket, key)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if is_missing(&message) {
                    StorageError::NotFound(key.to_string())
                } else if message.contains("AccessDenied") {
                    StorageError::AccessDenied(key.to_string())
                } else {
                    StorageError::Backend(format!("Failed to get file '{}': {}", key, message))
                }
            })?;

        let content = response.content.to_segmented_bytes().await.map_err(|e| {
            StorageError::Backend(format!("Failed to read file '{}' content: {}", key, e))
        })?;

        Ok(content.to_bytes().to_vec())
    }

    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        validate_location(bucket, key)?;

        let bytes = SegmentedBytes::from(Bytes::from(data));

        self.client
            .put_object(bucket, key, bytes)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to put file '{}': {}", key, e)))?;

        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        validate_location(bucket, key)?;

        match self.client.stat_object(bucket, key).send().await {
            Ok(_) => Ok(true),
            Err(e) if is_missing(&e.to_string()) => Ok(false),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to check existence of file '{}': {}",
                key, e
            ))),
        }
    }
}
