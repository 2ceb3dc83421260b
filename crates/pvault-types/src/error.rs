use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unknown version status: {0}")]
    UnknownStatus(String),

    #[error("invalid version number: {0} (must be >= 1)")]
    InvalidVersionNumber(i64),
}
