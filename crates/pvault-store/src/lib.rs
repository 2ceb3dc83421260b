//! Row-oriented persistent store for Process Vault.
//!
//! The version history treats its backing database as a black box reachable
//! through three operations: `insert`, `select` and `update`. This crate
//! defines that boundary and ships two backends.
//!
//! # Storage Backends
//!
//! All backends implement the [`RowStore`] trait:
//!
//! - [`InMemoryRowStore`] -- in-process store for tests and embedding
//! - [`JsonFileRowStore`] -- single JSON file, reloaded and rewritten under a
//!   file lock on every mutation
//!
//! # Design Rules
//!
//! 1. Rows are JSON objects; the store never interprets them beyond the
//!    columns named in filters and ordering.
//! 2. Only single-row atomicity is guaranteed. There is no compare-and-swap.
//! 3. Every row has an `id` column; `insert` assigns one when absent and
//!    rejects duplicates.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod query;
pub mod row;
pub mod table;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileRowStore;
pub use memory::InMemoryRowStore;
pub use query::{Filter, Order, Query};
pub use row::{from_row, to_row, Row};
pub use traits::RowStore;
