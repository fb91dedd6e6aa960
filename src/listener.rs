//! Pre-removal hook registry.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Backup;

/// A hook invoked immediately before a backup is removed. Returning an
/// error aborts that single deletion; the pipeline stops invoking further
/// hooks and propagates the error to its caller.
#[async_trait]
pub trait BackupRemovalListener: Send + Sync {
    async fn on_before_backup_remove(&self, backup: &Backup) -> Result<()>;
}

/// Append-only registry of [`BackupRemovalListener`]s, iterated in
/// registration order.
///
/// Registration happens at startup; the registry should be frozen (wrapped
/// in an `Arc` and handed to the cleaner loop) before `run` starts, per the
/// "freeze before run starts" guidance — this type itself does not offer
/// removal, only registration, to make that discipline the path of least
/// resistance.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Box<dyn BackupRemovalListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn BackupRemovalListener>) {
        self.listeners.push(listener);
    }

    /// Run every registered hook in registration order. The first error
    /// aborts iteration and is returned; later hooks are not invoked.
    pub async fn run_before_remove(&self, backup: &Backup) -> Result<()> {
        for listener in &self.listeners {
            listener.on_before_backup_remove(backup).await?;
        }
        Ok(())
    }
}
