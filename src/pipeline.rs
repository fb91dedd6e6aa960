//! End-to-end deletion of a single backup: pre-hooks, best-effort blob
//! cleanup, then authoritative catalog removal.

use std::sync::Arc;

use crate::error::Result;
use crate::listener::ListenerRegistry;
use crate::model::Backup;
use crate::repository::BackupRepository;
use crate::storage::service::{CredentialEncryptor, StorageService};

/// Removes one backup end-to-end.
///
/// Ordering rationale (§4.4): best-effort remote cleanup first, then
/// authoritative catalog removal, so a partial failure may leave orphan
/// blobs but never an orphan catalog row.
pub struct DeletionPipeline {
    repository: Arc<dyn BackupRepository>,
    storage_service: Arc<dyn StorageService>,
    listeners: Arc<ListenerRegistry>,
    encryptor: Arc<dyn CredentialEncryptor>,
}

impl DeletionPipeline {
    pub fn new(
        repository: Arc<dyn BackupRepository>,
        storage_service: Arc<dyn StorageService>,
        listeners: Arc<ListenerRegistry>,
        encryptor: Arc<dyn CredentialEncryptor>,
    ) -> Self {
        Self {
            repository,
            storage_service,
            listeners,
            encryptor,
        }
    }

    /// Delete a single backup.
    ///
    /// 1. Pre-removal hooks, in registration order. Any error aborts here —
    ///    no storage or catalog state is touched.
    /// 2. Resolve the storage handle. Not-found aborts here too; the
    ///    catalog row stays.
    /// 3. Delete the main blob. Failure is logged and swallowed.
    /// 4. Delete the companion metadata blob (`{file_name}.metadata`), same
    ///    swallow-and-log policy.
    /// 5. Delete the catalog row. This is the authoritative step: its
    ///    error, if any, is returned to the caller.
    pub async fn delete_backup(&self, backup: &Backup) -> Result<()> {
        self.listeners.run_before_remove(backup).await?;

        let storage = self.storage_service.get_storage_by_id(backup.storage_id).await?;

        if let Err(e) = storage
            .delete_file(self.encryptor.as_ref(), &backup.file_name)
            .await
        {
            tracing::warn!(
                backup_id = %backup.id,
                file_name = %backup.file_name,
                error = %e,
                "failed to delete backup blob, continuing"
            );
        }

        let metadata_key = backup.metadata_file_name();
        if let Err(e) = storage
            .delete_file(self.encryptor.as_ref(), &metadata_key)
            .await
        {
            tracing::warn!(
                backup_id = %backup.id,
                file_name = %metadata_key,
                error = %e,
                "failed to delete backup metadata blob, continuing"
            );
        }

        self.repository.delete_by_id(backup.id).await
    }
}
