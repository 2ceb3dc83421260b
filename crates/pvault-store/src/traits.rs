use async_trait::async_trait;

use crate::error::StoreResult;
use crate::query::{Filter, Query};
use crate::row::Row;

/// Row-oriented persistent store.
///
/// All implementations must satisfy these invariants:
/// - Each call is atomic for the rows it touches; nothing more is promised.
///   Callers needing read-then-write consistency must serialize themselves.
/// - `select` returns rows in the requested order, or insertion order when
///   no order is given.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Insert a row and return it as stored (with its `id` assigned).
    ///
    /// Returns `Err(StoreError::Conflict)` if the `id` already exists.
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Return the rows matching the query.
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Merge `patch` into every row matching all filters.
    ///
    /// Returns the updated rows; an empty result means nothing matched.
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>>;

    /// Return the first row matching the query, if any.
    async fn select_one(&self, query: &Query) -> StoreResult<Option<Row>> {
        let query = query.clone().limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }
}
