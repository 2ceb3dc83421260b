//! Append-only version history for Process Vault.
//!
//! This crate is the heart of Process Vault. It provides:
//! - [`VersionHistory`]: monotonic version numbering, snapshot creation,
//!   restore-as-new-version, and review status changes over any [`RowStore`]
//! - [`HistoryValidator`]: detection of duplicate numbers and gaps
//! - [`BoardAnalytics`]: dashboard aggregates over a board's processes
//! - [`search_processes`]: title, description, tag and diagram search
//! - [`HistoryConfig`]: status policy, paging and serialization settings
//!
//! History is never rewritten. Restoring version 3 while at version 7
//! produces version 8 with version 3's snapshot.
//!
//! [`RowStore`]: pvault_store::RowStore

pub mod analytics;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod locks;
pub mod search;
pub mod tables;
pub mod validation;

pub use analytics::{BoardAnalytics, StatusDistribution};
pub use clock::MonotonicClock;
pub use config::HistoryConfig;
pub use error::{HistoryError, HistoryResult};
pub use history::VersionHistory;
pub use search::{search_processes, MatchField, SearchFilters, SearchHit};
pub use validation::{HistoryValidator, ValidationReport, Violation, ViolationKind};
