//! Table evaluation shared by the in-process backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query};
use crate::row::Row;

/// All tables of a store, each an insertion-ordered list of rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables {
    tables: BTreeMap<String, Vec<Row>>,
}

impl Tables {
    /// A store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, assigning a UUID v7 `id` when the row has none.
    pub fn insert(&mut self, table: &str, mut row: Row) -> StoreResult<Row> {
        let id = match row.get("id") {
            Some(Value::Null) | None => {
                let id = Value::String(uuid::Uuid::now_v7().to_string());
                row.insert("id".into(), id.clone());
                id
            }
            Some(id) => id.clone(),
        };

        let rows = self.tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.get("id") == Some(&id)) {
            return Err(StoreError::Conflict {
                table: table.to_string(),
                id: display_id(&id),
            });
        }

        rows.push(row.clone());
        Ok(row)
    }

    /// Evaluate a query: filter, stable sort, offset, limit.
    pub fn select(&self, query: &Query) -> Vec<Row> {
        let Some(rows) = self.tables.get(&query.table) else {
            return Vec::new();
        };

        let mut matched: Vec<&Row> = rows.iter().filter(|r| query.matches(r)).collect();
        if let Some(order) = &query.order {
            matched.sort_by(|a, b| order.compare(a, b));
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        matched
            .into_iter()
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Merge `patch` into every row matching all filters; return the updated rows.
    pub fn update(&mut self, table: &str, filters: &[Filter], patch: &Row) -> Vec<Row> {
        let Some(rows) = self.tables.get_mut(table) else {
            return Vec::new();
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if filters.iter().all(|f| f.matches(row)) {
                for (column, value) in patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        updated
    }

    /// Number of rows in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map(Vec::len).unwrap_or(0)
    }

    /// Names of all tables that have ever received a row.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
