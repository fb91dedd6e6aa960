//! Azure Blob Storage backend implementation.

use async_trait::async_trait;
use azure_storage::StorageCredentials;
use azure_storage_blobs::prelude::*;

use super::{ObjectMetadata, ObjectStoreBackend, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Azure Blob Storage backend.
pub struct AzureBackend {
    client: ContainerClient,
}

impl AzureBackend {
    /// Create a new Azure backend.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let (account_name, container, access_key) = match config {
            StorageConfig::Azure {
                account_name,
                container,
                access_key,
            } => (account_name, container, access_key),
            _ => {
                return Err(StorageError::AuthenticationFailed(
                    "invalid configuration for Azure".to_string(),
                ))
            }
        };

        let credentials = match access_key {
            Some(key) => StorageCredentials::access_key(account_name.clone(), key),
            None => {
                return Err(StorageError::AuthenticationFailed(
                    "no access key provided".to_string(),
                ))
            }
        };

        let blob_service = BlobServiceClient::new(account_name, credentials);
        let client = blob_service.container_client(&container);

        Ok(Self { client })
    }

    fn map_err<E: std::fmt::Display>(err: E) -> StorageError {
        StorageError::Azure(err.to_string())
    }
}

#[async_trait]
impl ObjectStoreBackend for AzureBackend {
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .blob_client(key)
            .delete()
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.client
            .blob_client(key)
            .exists()
            .await
            .map_err(Self::map_err)
    }

    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let props = self
            .client
            .blob_client(key)
            .get_properties()
            .await
            .map_err(Self::map_err)?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: props.blob.properties.content_length,
            last_modified: props.blob.properties.last_modified,
            etag: Some(props.blob.properties.etag.to_string()),
        })
    }
}
