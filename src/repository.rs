//! Catalog-facing repository interface the engine consumes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Backup, BackupStatus};

/// Catalog query/mutation surface the retention engine needs. Persistence
/// itself (SQL, connection pooling, migrations) is out of scope for this
/// crate; this trait is the entire contract an implementer must satisfy.
#[async_trait]
pub trait BackupRepository: Send + Sync {
    /// All backups (any status) for a database created before `before`,
    /// ordered newest-first.
    async fn find_backups_before_date(
        &self,
        database_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Vec<Backup>>;

    /// All backups for a database in a given status, ordered newest-first.
    async fn find_by_database_id_and_status(
        &self,
        database_id: Uuid,
        status: BackupStatus,
    ) -> Result<Vec<Backup>>;

    /// The oldest non-`IN_PROGRESS` backups for a database, ordered
    /// oldest-first, capped at `limit`.
    async fn find_oldest_by_database_excluding_in_progress(
        &self,
        database_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Backup>>;

    /// Sum of `backupSizeMb` over `COMPLETED` backups for a database.
    async fn get_total_size_by_database(&self, database_id: Uuid) -> Result<f64>;

    /// Delete a catalog row by id. Deleting an id that no longer exists is
    /// success-equivalent (idempotent), since the engine assumes no
    /// distributed coordination and tolerates redundant deletes.
    async fn delete_by_id(&self, id: Uuid) -> Result<()>;

    /// All backups for a database, any status. Used by callers other than
    /// the cleaner loop itself (tests, administrative tooling).
    async fn find_by_database_id(&self, database_id: Uuid) -> Result<Vec<Backup>>;
}
