//! Process-wide settings, constructed once at startup and injected rather
//! than read ad hoc from the environment. See SPEC_FULL.md §10.3.

use chrono::Duration;

/// Default cleaner tick interval (§6: "Tick interval constant: 60 seconds").
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;

/// Default grace period (§6: "Grace period constant: 60 minutes").
pub const DEFAULT_GRACE_PERIOD_MINUTES: i64 = 60;

/// Small dependency-injection root for the engine's ambient configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Whether the deployment runs in cloud mode. The validator forces
    /// `BackupEncryption::Encrypted` when this is set.
    pub cloud_mode: bool,
    /// Cleaner tick interval. Defaults to [`DEFAULT_TICK_INTERVAL_SECS`].
    pub tick_interval_secs: u64,
    /// Grace period below which a backup is immune to every retention
    /// policy and the size cap. Defaults to [`DEFAULT_GRACE_PERIOD_MINUTES`].
    pub grace_period: Duration,
}

impl EngineSettings {
    pub fn new(cloud_mode: bool) -> Self {
        Self {
            cloud_mode,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            grace_period: Duration::minutes(DEFAULT_GRACE_PERIOD_MINUTES),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(false)
    }
}
