//! Error types for the retention engine.

use thiserror::Error;

/// Main error type for retention-engine operations.
#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("repository error: {0}")]
    Repository(String),

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("listener rejected removal: {0}")]
    ListenerRejected(String),

    #[error("config not found for database {0}")]
    ConfigNotFound(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("cleaner already started")]
    AlreadyStarted,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 error: {0}")]
    S3(String),

    #[error("GCS error: {0}")]
    Gcs(String),

    #[error("Azure error: {0}")]
    Azure(String),

    #[error("storage handle not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("network error: {0}")]
    Network(String),
}

/// A single validation failure. Validator errors are returned verbatim to
/// the platform's write path and are asserted on verbatim by tests, so this
/// intentionally does not piggyback on `RetentionError`'s `#[error(...)]`
/// formatting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type alias for retention-engine operations.
pub type Result<T> = std::result::Result<T, RetentionError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type alias for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
