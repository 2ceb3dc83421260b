use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query};
use crate::row::Row;
use crate::table::Tables;
use crate::traits::RowStore;

/// In-memory, HashMap-based row store.
///
/// Intended for tests and embedding. Tables are held behind a `RwLock`;
/// rows are cloned on read and write.
pub struct InMemoryRowStore {
    tables: RwLock<Tables>,
}

impl InMemoryRowStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.read().map(|t| t.row_count(table)).unwrap_or(0)
    }

    /// Snapshot of every table, for inspection in tests.
    pub fn snapshot(&self) -> StoreResult<Tables> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("store read lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("store write lock poisoned".into()))
    }
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        self.write()?.insert(table, row)
    }

    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        Ok(self.read()?.select(query))
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        Ok(self.write()?.update(table, filters, &patch))
    }
}

impl std::fmt::Debug for InMemoryRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.read().map(|t| t.table_names()).unwrap_or_default();
        f.debug_struct("InMemoryRowStore")
            .field("tables", &tables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Order;
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_then_select() {
        let store = InMemoryRowStore::new();
        store
            .insert("profiles", row(json!({"id": "u1", "full_name": "Ana"})))
            .await
            .unwrap();

        let rows = store
            .select(&Query::table("profiles").filter(Filter::eq("id", "u1")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["full_name"], "Ana");
        assert_eq!(store.row_count("profiles"), 1);
    }

    #[tokio::test]
    async fn select_one_takes_first_in_order() {
        let store = InMemoryRowStore::new();
        for n in [3, 7, 5] {
            store.insert("v", row(json!({"n": n}))).await.unwrap();
        }
        let top = store
            .select_one(&Query::table("v").order_by(Order::desc("n")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(top["n"], 7);

        let none = store.select_one(&Query::table("empty")).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn update_is_visible_to_later_reads() {
        let store = InMemoryRowStore::new();
        store.insert("v", row(json!({"id": "a", "status": "draft"}))).await.unwrap();
        store
            .update("v", &[Filter::eq("id", "a")], row(json!({"status": "approved"})))
            .await
            .unwrap();

        let rows = store.select(&Query::table("v")).await.unwrap();
        assert_eq!(rows[0]["status"], "approved");
    }

    #[test]
    fn debug_lists_tables() {
        let store = InMemoryRowStore::new();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("InMemoryRowStore"));
    }
}
