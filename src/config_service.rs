//! Read-side interface onto backup-configuration records.

use async_trait::async_trait;

use crate::config::BackupConfig;
use crate::error::Result;

/// Supplies the set of configs the cleaner loop should consider on a tick.
#[async_trait]
pub trait BackupConfigService: Send + Sync {
    /// All configs with `isBackupsEnabled = true`. The engine ignores every
    /// other config outright.
    async fn get_backup_configs_with_enabled_backups(&self) -> Result<Vec<BackupConfig>>;
}
