//! # Backup Retention Engine
//!
//! Background subsystem of a managed database-backup platform that decides,
//! on a periodic tick, which recorded backups must be deleted — both from
//! object storage and from the relational catalog — so that each database
//! stays within its configured retention policy and size limits.
//!
//! ## Architecture
//!
//! - [`period`]: named time-span algebra with a `FOREVER` maximum.
//! - [`config`]: backup-configuration records and the validator that checks
//!   them against per-database plan limits before the platform persists them.
//! - [`gfs`]: pure Grandfather-Father-Son keep-set construction.
//! - [`pipeline`]: end-to-end deletion of a single backup.
//! - [`cleaner`]: the periodic driver that ties retention dispatch and size
//!   enforcement together.
//! - [`storage`]: multi-cloud object store backends (S3, GCS, Azure) plus the
//!   narrow [`storage::service::StorageService`] seam the cleaner consumes.
//! - [`repository`], [`config_service`], [`listener`]: the external
//!   interfaces the engine consumes; an embedder supplies the
//!   implementations.
//!
//! ## Example
//!
//! ```rust,no_run
//! use backup_retention_engine::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     repository: Arc<dyn BackupRepository>,
//! #     storage_service: Arc<dyn StorageService>,
//! #     config_service: Arc<dyn BackupConfigService>,
//! # ) -> Result<()> {
//! let listeners = Arc::new(ListenerRegistry::new());
//! let encryptor = Arc::new(NoopEncryptor);
//! let settings = EngineSettings::new(true);
//!
//! let cleaner = CleanerLoop::new(
//!     repository,
//!     storage_service,
//!     config_service,
//!     listeners,
//!     encryptor,
//!     settings,
//! );
//!
//! let token = tokio_util::sync::CancellationToken::new();
//! cleaner.run(token).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod cleaner;
pub mod config;
pub mod config_service;
pub mod error;
pub mod gfs;
pub mod listener;
pub mod model;
pub mod period;
pub mod pipeline;
pub mod repository;
pub mod settings;
pub mod storage;

/// Crate version, surfaced for diagnostics and structured log context.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience re-exports for embedders wiring the engine into a host
/// application.
pub mod prelude {
    pub use crate::cleaner::CleanerLoop;
    pub use crate::config::{validate, BackupConfig, DatabasePlan, GfsCounters, RetentionPolicyType};
    pub use crate::config_service::BackupConfigService;
    pub use crate::error::{Result, RetentionError, StorageError, ValidationError};
    pub use crate::gfs::{keep_set, GfsBudgets};
    pub use crate::listener::{BackupRemovalListener, ListenerRegistry};
    pub use crate::model::{Backup, BackupStatus};
    pub use crate::period::Period;
    pub use crate::pipeline::DeletionPipeline;
    pub use crate::repository::BackupRepository;
    pub use crate::settings::EngineSettings;
    pub use crate::storage::service::{CredentialEncryptor, NoopEncryptor, StorageService};
}
