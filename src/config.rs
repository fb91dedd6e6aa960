//! Backup-configuration records and the validator that checks them against
//! per-database plan limits before the platform persists them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ValidationError, ValidationResult};
use crate::period::Period;
use crate::settings::EngineSettings;

/// Retention policy family a [`BackupConfig`] is configured for.
///
/// An empty string on the read path is treated as [`RetentionPolicyType::TimePeriod`]
/// (§3, §9) — both the validator and the cleaner must keep this mapping in
/// sync or rows written before this rule existed become unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicyType {
    TimePeriod,
    Count,
    Gfs,
}

impl RetentionPolicyType {
    /// Parse the raw `retentionPolicyType` string from a config record.
    /// Returns `None` for anything that isn't a known type or the empty
    /// string (the caller should report "invalid retention policy type").
    pub fn from_raw(raw: &str) -> Option<RetentionPolicyType> {
        match raw {
            "" | "TIME_PERIOD" => Some(RetentionPolicyType::TimePeriod),
            "COUNT" => Some(RetentionPolicyType::Count),
            "GFS" => Some(RetentionPolicyType::Gfs),
            _ => None,
        }
    }
}

/// Encryption-at-rest setting for a config's backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupEncryption {
    None,
    Encrypted,
}

impl BackupEncryption {
    fn from_raw(raw: &str) -> Option<Option<BackupEncryption>> {
        match raw {
            "" => Some(None),
            "NONE" => Some(Some(BackupEncryption::None)),
            "ENCRYPTED" => Some(Some(BackupEncryption::Encrypted)),
            _ => None,
        }
    }
}

/// GFS slot budgets carried on a [`BackupConfig`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GfsCounters {
    pub hours: u32,
    pub days: u32,
    pub weeks: u32,
    pub months: u32,
    pub years: u32,
}

impl GfsCounters {
    fn any_positive(&self) -> bool {
        self.hours > 0 || self.days > 0 || self.weeks > 0 || self.months > 0 || self.years > 0
    }
}

/// One backup-configuration record, one per database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    pub database_id: Uuid,
    pub is_backups_enabled: bool,

    /// Raw `retentionPolicyType`; see [`RetentionPolicyType::from_raw`].
    pub retention_policy_type: String,
    /// Raw period string for `TIME_PERIOD` configs (e.g. `"DAY"`).
    pub retention_time_period: String,
    pub retention_count: i64,
    pub retention_gfs: GfsCounters,

    /// Schedule descriptor; the engine only checks it is present.
    pub backup_interval: Option<String>,

    pub storage_id: Uuid,
    /// Raw encryption string: `""`, `"NONE"`, or `"ENCRYPTED"`.
    pub encryption: String,

    pub is_retry_if_failed: bool,
    pub max_failed_tries_count: i64,

    pub max_backup_size_mb: i64,
    pub max_backups_total_size_mb: i64,

    pub send_notifications_on: Vec<String>,
}

impl BackupConfig {
    /// Parsed retention policy type, applying the empty-string-as-`TIME_PERIOD` rule.
    pub fn policy_type(&self) -> Option<RetentionPolicyType> {
        RetentionPolicyType::from_raw(&self.retention_policy_type)
    }

    /// Parsed retention period for `TIME_PERIOD` configs, if any and valid.
    pub fn time_period(&self) -> Option<Period> {
        if self.retention_time_period.is_empty() {
            None
        } else {
            Period::parse(&self.retention_time_period).ok()
        }
    }
}

/// Per-database plan envelope enforced by the validator. Zero means
/// unlimited for every field except `max_storage_period`, whose unlimited
/// value is [`Period::Forever`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DatabasePlan {
    pub max_backup_size_mb: i64,
    pub max_backups_total_size_mb: i64,
    pub max_storage_period: Period,
}

/// Validates a [`BackupConfig`] against a [`DatabasePlan`].
///
/// Checks run in the fixed order documented in SPEC_FULL.md §4.2; the first
/// failing check's message is returned. Pure and deterministic: the same
/// `(config, plan, settings)` always produces the same result.
pub fn validate(
    config: &BackupConfig,
    plan: &DatabasePlan,
    settings: &EngineSettings,
) -> ValidationResult<()> {
    // 1. backup interval required.
    if config
        .backup_interval
        .as_ref()
        .map(|s| s.is_empty())
        .unwrap_or(true)
    {
        return Err(ValidationError::new("backup interval is required"));
    }

    // 2. retention-policy sub-validation.
    match config.policy_type() {
        Some(RetentionPolicyType::TimePeriod) => {
            if config.retention_time_period.is_empty() {
                return Err(ValidationError::new("retention time period is required"));
            }
            let period = Period::parse(&config.retention_time_period)
                .map_err(|_| ValidationError::new("retention time period is required"))?;
            if plan.max_storage_period != Period::Forever
                && period.compare(plan.max_storage_period) == std::cmp::Ordering::Greater
            {
                return Err(ValidationError::new("storage period exceeds plan limit"));
            }
        }
        Some(RetentionPolicyType::Count) => {
            if config.retention_count < 1 {
                return Err(ValidationError::new(
                    "retention count must be greater than 0",
                ));
            }
        }
        Some(RetentionPolicyType::Gfs) => {
            if !config.retention_gfs.any_positive() {
                return Err(ValidationError::new(
                    "at least one GFS retention field must be greater than 0",
                ));
            }
        }
        None => {
            return Err(ValidationError::new("invalid retention policy type"));
        }
    }

    // 3. retry settings.
    if config.is_retry_if_failed && config.max_failed_tries_count < 1 {
        return Err(ValidationError::new(
            "max failed tries count must be greater than 0",
        ));
    }

    // 4. encryption value.
    let encryption = BackupEncryption::from_raw(&config.encryption)
        .ok_or_else(|| ValidationError::new("encryption must be NONE or ENCRYPTED"))?;

    // 5. cloud mode mandates encryption.
    if settings.cloud_mode && encryption != Some(BackupEncryption::Encrypted) {
        return Err(ValidationError::new(
            "encryption is mandatory for cloud storage",
        ));
    }

    // 6 / 7. non-negative sizes.
    if config.max_backup_size_mb < 0 {
        return Err(ValidationError::new(
            "max backup size must be non-negative",
        ));
    }
    if config.max_backups_total_size_mb < 0 {
        return Err(ValidationError::new(
            "max backups total size must be non-negative",
        ));
    }

    // 8. plan size gates — only when the plan itself sets a nonzero limit.
    if plan.max_backup_size_mb > 0
        && (config.max_backup_size_mb == 0 || config.max_backup_size_mb > plan.max_backup_size_mb)
    {
        return Err(ValidationError::new("max backup size exceeds plan limit"));
    }
    if plan.max_backups_total_size_mb > 0
        && (config.max_backups_total_size_mb == 0
            || config.max_backups_total_size_mb > plan.max_backups_total_size_mb)
    {
        return Err(ValidationError::new(
            "max total backups size exceeds plan limit",
        ));
    }

    Ok(())
}
