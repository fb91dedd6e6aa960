//! Periodic driver: per-tick retention dispatch followed by size enforcement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::{BackupConfig, RetentionPolicyType};
use crate::config_service::BackupConfigService;
use crate::error::{RetentionError, Result};
use crate::gfs::{self, GfsBudgets};
use crate::listener::ListenerRegistry;
use crate::model::{Backup, BackupStatus};
use crate::pipeline::DeletionPipeline;
use crate::repository::BackupRepository;
use crate::settings::EngineSettings;
use crate::storage::service::{CredentialEncryptor, StorageService};

/// The periodic retention driver. One instance per process; `run` is
/// strictly single-shot (§5: "a safe pattern is an atomic has-run flag").
pub struct CleanerLoop {
    repository: Arc<dyn BackupRepository>,
    storage_service: Arc<dyn StorageService>,
    config_service: Arc<dyn BackupConfigService>,
    listeners: Arc<ListenerRegistry>,
    encryptor: Arc<dyn CredentialEncryptor>,
    settings: EngineSettings,
    started: AtomicBool,
}

impl CleanerLoop {
    pub fn new(
        repository: Arc<dyn BackupRepository>,
        storage_service: Arc<dyn StorageService>,
        config_service: Arc<dyn BackupConfigService>,
        listeners: Arc<ListenerRegistry>,
        encryptor: Arc<dyn CredentialEncryptor>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repository,
            storage_service,
            config_service,
            listeners,
            encryptor,
            settings,
            started: AtomicBool::new(false),
        }
    }

    fn pipeline(&self) -> DeletionPipeline {
        DeletionPipeline::new(
            self.repository.clone(),
            self.storage_service.clone(),
            self.listeners.clone(),
            self.encryptor.clone(),
        )
    }

    /// Run the periodic loop until `cancellation` fires. Fatal error if
    /// called more than once on the same instance.
    pub async fn run(&self, cancellation: CancellationToken) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RetentionError::AlreadyStarted);
        }

        let interval = std::time::Duration::from_secs(self.settings.tick_interval_secs);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }
            if cancellation.is_cancelled() {
                return Ok(());
            }
            self.tick().await;
        }
    }

    /// Run exactly one tick: retention phase, then size phase. Exposed
    /// directly so callers (and tests) can drive ticks without waiting on
    /// the timer.
    pub async fn tick(&self) {
        let configs = match self.config_service.get_backup_configs_with_enabled_backups().await {
            Ok(configs) => configs,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load backup configs, skipping tick");
                return;
            }
        };

        for config in &configs {
            if let Err(e) = self.clean_by_retention_policy(config).await {
                tracing::warn!(
                    database_id = %config.database_id,
                    policy = %config.retention_policy_type,
                    error = %e,
                    "retention policy pass failed"
                );
            }
        }

        for config in &configs {
            if let Err(e) = self.clean_exceeded_backups(config).await {
                tracing::warn!(
                    database_id = %config.database_id,
                    error = %e,
                    "size cap enforcement failed"
                );
            }
        }
    }

    fn is_recent(&self, backup: &Backup, now: chrono::DateTime<Utc>) -> bool {
        backup.is_recent(now, self.settings.grace_period)
    }

    async fn clean_by_retention_policy(&self, config: &BackupConfig) -> Result<()> {
        let now = Utc::now();
        let candidates = match config.policy_type() {
            Some(RetentionPolicyType::TimePeriod) | None => {
                self.time_period_candidates(config, now).await?
            }
            Some(RetentionPolicyType::Count) => self.count_candidates(config).await?,
            Some(RetentionPolicyType::Gfs) => self.gfs_candidates(config).await?,
        };

        let pipeline = self.pipeline();
        for backup in candidates {
            if self.is_recent(&backup, now) {
                continue;
            }
            pipeline.delete_backup(&backup).await?;
        }
        Ok(())
    }

    async fn time_period_candidates(
        &self,
        config: &BackupConfig,
        now: chrono::DateTime<Utc>,
    ) -> Result<Vec<Backup>> {
        let period = match config.time_period() {
            Some(p) => p,
            None => return Ok(vec![]),
        };
        let Some(duration) = period.duration() else {
            // FOREVER: never expires.
            return Ok(vec![]);
        };
        let cutoff = now - duration;
        let backups = self
            .repository
            .find_backups_before_date(config.database_id, cutoff)
            .await?;
        // `find_backups_before_date` returns backups of any status (spec
        // §6); an in-progress backup must never be a deletion candidate.
        Ok(backups
            .into_iter()
            .filter(|b| b.status != BackupStatus::InProgress)
            .collect())
    }

    async fn count_candidates(&self, config: &BackupConfig) -> Result<Vec<Backup>> {
        let completed = self
            .repository
            .find_by_database_id_and_status(config.database_id, BackupStatus::Completed)
            .await?;
        let keep = config.retention_count.max(0) as usize;
        if completed.len() <= keep {
            return Ok(vec![]);
        }
        Ok(completed[keep..].to_vec())
    }

    async fn gfs_candidates(&self, config: &BackupConfig) -> Result<Vec<Backup>> {
        let completed = self
            .repository
            .find_by_database_id_and_status(config.database_id, BackupStatus::Completed)
            .await?;
        let budgets = GfsBudgets {
            hours: config.retention_gfs.hours,
            days: config.retention_gfs.days,
            weeks: config.retention_gfs.weeks,
            months: config.retention_gfs.months,
            years: config.retention_gfs.years,
        };
        let keep_set = gfs::keep_set(&completed, budgets);
        Ok(completed
            .into_iter()
            .filter(|b| !keep_set.contains(&b.id))
            .collect())
    }

    async fn clean_exceeded_backups(&self, config: &BackupConfig) -> Result<()> {
        if config.max_backups_total_size_mb <= 0 {
            return Ok(());
        }
        let cap = config.max_backups_total_size_mb as f64;
        let pipeline = self.pipeline();

        loop {
            let total = self
                .repository
                .get_total_size_by_database(config.database_id)
                .await?;
            if total <= cap {
                return Ok(());
            }

            let oldest = self
                .repository
                .find_oldest_by_database_excluding_in_progress(config.database_id, 1)
                .await?;
            let Some(backup) = oldest.into_iter().next() else {
                tracing::warn!(
                    database_id = %config.database_id,
                    total,
                    cap,
                    "over size cap with no deletable backups"
                );
                return Ok(());
            };

            let now = Utc::now();
            if self.is_recent(&backup, now) {
                tracing::warn!(
                    database_id = %config.database_id,
                    total,
                    cap,
                    backup_id = %backup.id,
                    "over size cap but oldest deletable backup is within grace period"
                );
                return Ok(());
            }

            pipeline.delete_backup(&backup).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GfsCounters;
    use crate::error::StorageError;
    use crate::storage::service::Storage as StorageHandle;
    use crate::storage::{ObjectMetadata, ObjectStoreBackend};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use std::sync::Mutex;

    struct InMemoryRepo {
        backups: Mutex<Vec<Backup>>,
    }

    impl InMemoryRepo {
        fn new(backups: Vec<Backup>) -> Self {
            Self {
                backups: Mutex::new(backups),
            }
        }
    }

    #[async_trait]
    impl BackupRepository for InMemoryRepo {
        async fn find_backups_before_date(
            &self,
            database_id: Uuid,
            before: DateTime<Utc>,
        ) -> Result<Vec<Backup>> {
            let mut v: Vec<Backup> = self
                .backups
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.database_id == database_id && b.created_at < before)
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }

        async fn find_by_database_id_and_status(
            &self,
            database_id: Uuid,
            status: BackupStatus,
        ) -> Result<Vec<Backup>> {
            let mut v: Vec<Backup> = self
                .backups
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.database_id == database_id && b.status == status)
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }

        async fn find_oldest_by_database_excluding_in_progress(
            &self,
            database_id: Uuid,
            limit: usize,
        ) -> Result<Vec<Backup>> {
            let mut v: Vec<Backup> = self
                .backups
                .lock()
                .unwrap()
                .iter()
                .filter(|b| {
                    b.database_id == database_id && b.status != BackupStatus::InProgress
                })
                .cloned()
                .collect();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            v.truncate(limit);
            Ok(v)
        }

        async fn get_total_size_by_database(&self, database_id: Uuid) -> Result<f64> {
            Ok(self
                .backups
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.database_id == database_id && b.status == BackupStatus::Completed)
                .map(|b| b.backup_size_mb)
                .sum())
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<()> {
            self.backups.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }

        async fn find_by_database_id(&self, database_id: Uuid) -> Result<Vec<Backup>> {
            Ok(self
                .backups
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.database_id == database_id)
                .cloned()
                .collect())
        }
    }

    struct NoopBackend;

    #[async_trait]
    impl ObjectStoreBackend for NoopBackend {
        async fn delete(&self, _key: &str) -> std::result::Result<(), StorageError> {
            Ok(())
        }
        async fn exists(&self, _key: &str) -> std::result::Result<bool, StorageError> {
            Ok(false)
        }
        async fn get_metadata(
            &self,
            key: &str,
        ) -> std::result::Result<ObjectMetadata, StorageError> {
            Ok(ObjectMetadata {
                key: key.to_string(),
                size: 0,
                last_modified: Utc::now(),
                etag: None,
            })
        }
    }

    struct SingleBackendStorageService;

    #[async_trait]
    impl StorageService for SingleBackendStorageService {
        async fn get_storage_by_id(&self, _id: Uuid) -> Result<StorageHandle> {
            Ok(StorageHandle::new(Arc::new(NoopBackend)))
        }
    }

    struct StaticConfigService {
        configs: Vec<BackupConfig>,
    }

    #[async_trait]
    impl BackupConfigService for StaticConfigService {
        async fn get_backup_configs_with_enabled_backups(&self) -> Result<Vec<BackupConfig>> {
            Ok(self.configs.clone())
        }
    }

    fn backup(database_id: Uuid, created_at: DateTime<Utc>, size_mb: f64) -> Backup {
        Backup {
            id: Uuid::new_v4(),
            database_id,
            storage_id: Uuid::new_v4(),
            status: BackupStatus::Completed,
            backup_size_mb: size_mb,
            created_at,
            file_name: format!("backup-{}", Uuid::new_v4()),
        }
    }

    fn base_config(database_id: Uuid) -> BackupConfig {
        BackupConfig {
            database_id,
            is_backups_enabled: true,
            retention_policy_type: "TIME_PERIOD".to_string(),
            retention_time_period: "DAY".to_string(),
            retention_count: 0,
            retention_gfs: GfsCounters::default(),
            backup_interval: Some("0 0 * * *".to_string()),
            storage_id: Uuid::new_v4(),
            encryption: "NONE".to_string(),
            is_retry_if_failed: false,
            max_failed_tries_count: 0,
            max_backup_size_mb: 0,
            max_backups_total_size_mb: 0,
            send_notifications_on: vec![],
        }
    }

    fn cleaner(repo: Arc<InMemoryRepo>, configs: Vec<BackupConfig>) -> CleanerLoop {
        CleanerLoop::new(
            repo,
            Arc::new(SingleBackendStorageService),
            Arc::new(StaticConfigService { configs }),
            Arc::new(ListenerRegistry::new()),
            Arc::new(crate::storage::service::NoopEncryptor),
            EngineSettings::default(),
        )
    }

    #[tokio::test]
    async fn time_period_with_recent_survivor() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let a = backup(db, now - Duration::hours(48), 5.0);
        let b = backup(db, now - Duration::minutes(30), 5.0);
        let repo = Arc::new(InMemoryRepo::new(vec![a.clone(), b.clone()]));
        let mut config = base_config(db);
        config.retention_time_period = "DAY".to_string();
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining = repo.find_by_database_id(db).await.unwrap();
        let ids: Vec<Uuid> = remaining.iter().map(|x| x.id).collect();
        assert!(!ids.contains(&a.id));
        assert!(ids.contains(&b.id));
    }

    #[tokio::test]
    async fn count_with_recent_excess() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let n = backup(db, now - Duration::minutes(10), 1.0);
        let r = backup(db, now - Duration::minutes(30), 1.0);
        let o1 = backup(db, now - Duration::hours(3), 1.0);
        let o2 = backup(db, now - Duration::hours(5), 1.0);
        let repo = Arc::new(InMemoryRepo::new(vec![
            n.clone(),
            r.clone(),
            o1.clone(),
            o2.clone(),
        ]));
        let mut config = base_config(db);
        config.retention_policy_type = "COUNT".to_string();
        config.retention_count = 2;
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining: Vec<Uuid> = repo
            .find_by_database_id(db)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&n.id));
        assert!(remaining.contains(&r.id));
    }

    #[tokio::test]
    async fn gfs_additive_keeps_budgeted_and_deletes_rest() {
        use chrono::TimeZone;
        let db = Uuid::new_v4();
        let t0 = backup(db, Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap(), 1.0);
        let t1 = backup(db, Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap(), 1.0);
        let t2 = backup(db, Utc.with_ymd_and_hms(2025, 5, 18, 0, 0, 0).unwrap(), 1.0);
        let t3 = backup(db, Utc.with_ymd_and_hms(2025, 4, 18, 0, 0, 0).unwrap(), 1.0);
        let repo = Arc::new(InMemoryRepo::new(vec![
            t0.clone(),
            t1.clone(),
            t2.clone(),
            t3.clone(),
        ]));
        let mut config = base_config(db);
        config.retention_policy_type = "GFS".to_string();
        config.retention_gfs = GfsCounters {
            hours: 0,
            days: 1,
            weeks: 2,
            months: 2,
            years: 0,
        };
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining: Vec<Uuid> = repo
            .find_by_database_id(db)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert!(remaining.contains(&t0.id));
        assert!(remaining.contains(&t1.id));
        assert!(remaining.contains(&t2.id));
        assert!(!remaining.contains(&t3.id));
    }

    #[tokio::test]
    async fn size_cap_blocked_by_grace_logs_and_stops() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let a = backup(db, now - Duration::minutes(20), 8.0);
        let b = backup(db, now - Duration::minutes(25), 8.0);
        let repo = Arc::new(InMemoryRepo::new(vec![a.clone(), b.clone()]));
        let mut config = base_config(db);
        config.max_backups_total_size_mb = 10;
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining = repo.find_by_database_id(db).await.unwrap();
        assert_eq!(remaining.len(), 2);
    }

    #[tokio::test]
    async fn size_cap_evicts_oldest_until_satisfied() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let a = backup(db, now - Duration::hours(10), 8.0);
        let b = backup(db, now - Duration::hours(9), 8.0);
        let repo = Arc::new(InMemoryRepo::new(vec![a.clone(), b.clone()]));
        let mut config = base_config(db);
        config.max_backups_total_size_mb = 10;
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining: Vec<Uuid> = repo
            .find_by_database_id(db)
            .await
            .unwrap()
            .into_iter()
            .map(|x| x.id)
            .collect();
        assert_eq!(remaining, vec![b.id]);
    }

    #[tokio::test]
    async fn second_run_invocation_fails_fast() {
        let db = Uuid::new_v4();
        let repo = Arc::new(InMemoryRepo::new(vec![]));
        let loop_ = cleaner(repo, vec![base_config(db)]);
        let token = CancellationToken::new();
        token.cancel();
        loop_.run(token.clone()).await.unwrap();
        let err = loop_.run(token).await.unwrap_err();
        assert!(matches!(err, RetentionError::AlreadyStarted));
    }

    #[tokio::test]
    async fn in_progress_backup_is_never_a_count_candidate() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let mut in_progress = backup(db, now - Duration::hours(100), 1.0);
        in_progress.status = BackupStatus::InProgress;
        let completed = backup(db, now - Duration::hours(1), 1.0);
        let repo = Arc::new(InMemoryRepo::new(vec![in_progress.clone(), completed.clone()]));
        let mut config = base_config(db);
        config.retention_policy_type = "COUNT".to_string();
        config.retention_count = 0;
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining: Vec<Uuid> = repo
            .find_by_database_id(db)
            .await
            .unwrap()
            .into_iter()
            .map(|x| x.id)
            .collect();
        assert!(remaining.contains(&in_progress.id));
    }

    #[tokio::test]
    async fn in_progress_backup_is_never_a_time_period_candidate() {
        let db = Uuid::new_v4();
        let now = Utc::now();
        let mut in_progress = backup(db, now - Duration::hours(100), 1.0);
        in_progress.status = BackupStatus::InProgress;
        let completed = backup(db, now - Duration::hours(1), 1.0);
        let repo = Arc::new(InMemoryRepo::new(vec![in_progress.clone(), completed.clone()]));
        let mut config = base_config(db);
        config.retention_policy_type = "TIME_PERIOD".to_string();
        config.retention_time_period = "DAY".to_string();
        let loop_ = cleaner(repo.clone(), vec![config]);

        loop_.tick().await;

        let remaining: Vec<Uuid> = repo
            .find_by_database_id(db)
            .await
            .unwrap()
            .into_iter()
            .map(|x| x.id)
            .collect();
        assert!(remaining.contains(&in_progress.id));
    }
}
