//! Multi-cloud object store backend abstraction.
//!
//! This is shared platform-wide infrastructure (the same backends the
//! backup-creation path uploads through); the retention engine is a narrow
//! consumer that only ever calls [`ObjectStoreBackend::delete`] and
//! [`ObjectStoreBackend::exists`] through the [`service::Storage`] adapter.

pub mod azure;
pub mod gcs;
pub mod s3;
pub mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Metadata associated with a stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub last_modified: chrono::DateTime<chrono::Utc>,
    pub etag: Option<String>,
}

/// Storage backend configuration, one variant per supported cloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageConfig {
    S3 {
        region: String,
        bucket: String,
        endpoint: Option<String>,
    },
    Gcs {
        project_id: String,
        bucket: String,
    },
    Azure {
        account_name: String,
        container: String,
        access_key: Option<String>,
    },
}

/// Trait for storage backend implementations.
///
/// Narrowed to the operations the retention engine and its tests need;
/// the platform's backup-creation path depends on a wider sibling trait for
/// upload/list/multipart that this crate does not need to carry.
#[async_trait]
pub trait ObjectStoreBackend: Send + Sync {
    /// Delete an object. Idempotent: deleting an already-absent object is
    /// success, not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Fetch metadata for an object.
    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata>;
}

/// Create a storage backend from configuration.
pub async fn create_backend(config: StorageConfig) -> StorageResult<Box<dyn ObjectStoreBackend>> {
    match config {
        StorageConfig::S3 { .. } => Ok(Box::new(s3::S3Backend::new(config).await?)),
        StorageConfig::Gcs { .. } => Ok(Box::new(gcs::GcsBackend::new(config).await?)),
        StorageConfig::Azure { .. } => Ok(Box::new(azure::AzureBackend::new(config).await?)),
    }
}
