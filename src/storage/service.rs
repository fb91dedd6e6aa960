//! The narrow `StorageService`/`Storage` interface the deletion pipeline
//! consumes (§6), built atop [`super::ObjectStoreBackend`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::ObjectStoreBackend;
use crate::error::{RetentionError, Result, StorageError};

/// Decrypts storage credentials at the point of use. Field-level encryption
/// of storage credentials is handled by a sibling component; the engine
/// only consumes this trait so it never has to know how credentials are
/// stored or decrypted.
pub trait CredentialEncryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// A no-op encryptor for storage handles that carry no encrypted secrets
/// (e.g. ambient IAM role credentials). Useful as a default/test double.
pub struct NoopEncryptor;

impl CredentialEncryptor for NoopEncryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        Ok(ciphertext.to_string())
    }
}

/// A resolved storage target the pipeline can delete objects from.
pub struct Storage {
    backend: Arc<dyn ObjectStoreBackend>,
}

impl Storage {
    pub fn new(backend: Arc<dyn ObjectStoreBackend>) -> Self {
        Self { backend }
    }

    /// Delete a single object. `encryptor` mirrors the original
    /// `deleteFile(encryptor, fileName)` signature (§6): some backends
    /// need it to decrypt per-request signing credentials, even though the
    /// reference backend implementations in this crate use ambient
    /// credentials and ignore it.
    pub async fn delete_file(
        &self,
        _encryptor: &dyn CredentialEncryptor,
        file_name: &str,
    ) -> Result<()> {
        self.backend
            .delete(file_name)
            .await
            .map_err(RetentionError::Storage)
    }
}

/// Resolves a `storageId` to a [`Storage`] handle.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn get_storage_by_id(&self, id: Uuid) -> Result<Storage>;
}

/// A [`StorageService`] backed by a static map of pre-constructed backends,
/// as used by an orchestrator that resolved all configured storage targets
/// at startup.
pub struct StaticStorageService {
    backends: HashMap<Uuid, Arc<dyn ObjectStoreBackend>>,
}

impl StaticStorageService {
    pub fn new(backends: HashMap<Uuid, Arc<dyn ObjectStoreBackend>>) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl StorageService for StaticStorageService {
    async fn get_storage_by_id(&self, id: Uuid) -> Result<Storage> {
        self.backends
            .get(&id)
            .cloned()
            .map(Storage::new)
            .ok_or_else(|| {
                RetentionError::Storage(StorageError::NotFound(id.to_string()))
            })
    }
}
