use std::path::PathBuf;

/// Errors from row store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row with the same `id` already exists in the table.
    #[error("duplicate id {id} in table {table}")]
    Conflict { table: String, id: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but cannot be decoded.
    #[error("corrupt store file {path}: {reason}")]
    CorruptFile { path: PathBuf, reason: String },

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend is unreachable or otherwise unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
