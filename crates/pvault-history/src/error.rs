use pvault_store::StoreError;
use pvault_types::{ProcessId, ProcessVersion, TypeError, VersionId};

/// Errors produced by version history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    #[error("process {process} has no version {number}")]
    VersionNumberNotFound { process: ProcessId, number: u32 },

    #[error("version {version} belongs to process {owner}, not {process}")]
    ForeignVersion {
        version: VersionId,
        owner: ProcessId,
        process: ProcessId,
    },

    /// The version was persisted but the process row still points at an
    /// older one. Re-reading the history finds the new version.
    #[error("version {} was saved but the current-version pointer is stale: {source}", version.version_number)]
    StalePointer {
        version: Box<ProcessVersion>,
        source: StoreError,
    },

    /// A stored version of the process has no integer `version_number`, so
    /// the next number cannot be assigned without risking reuse.
    #[error("process {process} has a version row with unusable number {value}")]
    CorruptNumbering { process: ProcessId, value: String },

    #[error("invalid record: {0}")]
    Type(#[from] TypeError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HistoryError {
    /// The persisted version, if the operation got far enough to create one.
    pub fn saved_version(&self) -> Option<&ProcessVersion> {
        match self {
            Self::StalePointer { version, .. } => Some(version),
            _ => None,
        }
    }
}

/// Convenience alias for history results.
pub type HistoryResult<T> = Result<T, HistoryError>;
