//! AWS S3 storage backend implementation.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;

use super::{ObjectMetadata, ObjectStoreBackend, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// AWS S3 storage backend.
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Create a new S3 backend.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let (region, bucket, endpoint) = match config {
            StorageConfig::S3 {
                region,
                bucket,
                endpoint,
            } => (region, bucket, endpoint),
            _ => {
                return Err(StorageError::AuthenticationFailed(
                    "invalid configuration for S3".to_string(),
                ))
            }
        };

        let mut config_builder = aws_config::from_env().region(Region::new(region));
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        let aws_config = config_builder.load().await;
        let client = Client::new(&aws_config);

        Ok(Self { client, bucket })
    }

    fn map_err<E: std::fmt::Display>(err: E) -> StorageError {
        StorageError::S3(err.to_string())
    }
}

#[async_trait]
impl ObjectStoreBackend for S3Backend {
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_err)?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: output.content_length().unwrap_or(0) as u64,
            last_modified: output
                .last_modified()
                .and_then(|dt| {
                    chrono::DateTime::parse_from_rfc3339(&dt.to_string())
                        .ok()
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                })
                .unwrap_or_else(chrono::Utc::now),
            etag: output.e_tag().map(|s| s.to_string()),
        })
    }
}
