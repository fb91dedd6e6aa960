//! Google Cloud Storage backend implementation.

use async_trait::async_trait;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::{
    delete::DeleteObjectRequest, get::GetObjectRequest,
};

use super::{ObjectMetadata, ObjectStoreBackend, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Google Cloud Storage backend.
pub struct GcsBackend {
    client: Client,
    bucket: String,
}

impl GcsBackend {
    /// Create a new GCS backend.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let bucket = match config {
            StorageConfig::Gcs { bucket, .. } => bucket,
            _ => {
                return Err(StorageError::AuthenticationFailed(
                    "invalid configuration for GCS".to_string(),
                ))
            }
        };

        let client_config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(Self::map_err)?;
        let client = Client::new(client_config);

        Ok(Self { client, bucket })
    }

    fn map_err<E: std::fmt::Display>(err: E) -> StorageError {
        StorageError::Gcs(err.to_string())
    }
}

#[async_trait]
impl ObjectStoreBackend for GcsBackend {
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object(&DeleteObjectRequest {
                bucket: self.bucket.clone(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .get_object(&GetObjectRequest {
                bucket: self.bucket.clone(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
        {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let obj = self
            .client
            .get_object(&GetObjectRequest {
                bucket: self.bucket.clone(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(Self::map_err)?;

        Ok(ObjectMetadata {
            key: obj.name.clone(),
            size: obj.size as u64,
            last_modified: obj
                .updated
                .and_then(|dt| {
                    chrono::DateTime::<chrono::Utc>::from_timestamp(
                        dt.unix_timestamp(),
                        dt.nanosecond(),
                    )
                })
                .unwrap_or_else(chrono::Utc::now),
            etag: Some(obj.etag.clone()),
        })
    }
}
