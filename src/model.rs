//! Catalog-facing data model the engine reads and deletes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal state of a catalog-recorded backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupStatus {
    InProgress,
    Completed,
    Failed,
}

/// One catalog row per produced backup.
///
/// The engine never writes these fields directly; it only ever deletes the
/// row (via [`crate::repository::BackupRepository::delete_by_id`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub id: Uuid,
    pub database_id: Uuid,
    pub storage_id: Uuid,
    pub status: BackupStatus,
    /// Size in MiB. Stored as float; total-size comparisons must cast the
    /// plan/config cap to float rather than truncating the sum.
    pub backup_size_mb: f64,
    pub created_at: DateTime<Utc>,
    /// Object-store key for the main blob. The companion metadata blob lives
    /// at `{file_name}.metadata`.
    pub file_name: String,
}

impl Backup {
    /// Key of the companion metadata object.
    pub fn metadata_file_name(&self) -> String {
        format!("{}.metadata", self.file_name)
    }

    /// Whether this backup falls inside the grace window as of `now`.
    pub fn is_recent(&self, now: DateTime<Utc>, grace_period: chrono::Duration) -> bool {
        now - self.created_at < grace_period
    }
}
