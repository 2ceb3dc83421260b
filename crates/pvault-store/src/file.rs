use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fd_lock::RwLock as FileLock;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query};
use crate::row::Row;
use crate::table::Tables;
use crate::traits::RowStore;

/// Row store persisted as a single JSON document.
///
/// Every mutation takes an exclusive lock on a sibling `.lock` file, reloads
/// the document, applies the change and rewrites it (temp file, then
/// rename) before releasing the lock. Handles on the same path, in this or
/// another process, therefore never overwrite each other's rows. Suited to
/// the CLI and to single-user desktop data; not a database.
pub struct JsonFileRowStore {
    path: PathBuf,
}

impl JsonFileRowStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// The file is decoded once here so corruption is reported up front.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let check = path.clone();
        run_blocking(move || load(&check).map(drop)).await?;
        tracing::debug!(path = %path.display(), "opened json row store");
        Ok(Self { path })
    }

    /// Path of the backing JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to the current document under the exclusive lock.
    /// The document is rewritten only when `change` reports a modification.
    async fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Tables) -> StoreResult<(T, bool)> + Send + 'static,
    {
        let path = self.path.clone();
        run_blocking(move || {
            let mut lock = FileLock::new(open_lock_file(&path)?);
            let _guard = lock.write()?;

            let mut tables = load(&path)?;
            let (out, modified) = change(&mut tables)?;
            if modified {
                persist(&path, &tables)?;
            }
            Ok(out)
        })
        .await
    }
}

async fn run_blocking<T, F>(work: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
}

fn load(path: &Path) -> StoreResult<Tables> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Tables::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::new()),
        Err(e) => Err(e.into()),
    }
}

fn persist(path: &Path, tables: &Tables) -> StoreResult<()> {
    let encoded =
        serde_json::to_vec_pretty(tables).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &encoded)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// The lock lives beside the document: the document itself is replaced by
/// rename, so a lock held on it would not survive the first write.
fn open_lock_file(path: &Path) -> StoreResult<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path.with_extension("json.lock"))?;
    Ok(file)
}

#[async_trait]
impl RowStore for JsonFileRowStore {
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let table = table.to_string();
        self.mutate(move |tables| Ok((tables.insert(&table, row)?, true)))
            .await
    }

    /// Reads take no lock; the rename in `persist` means a reader sees
    /// either the previous or the next complete document.
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let path = self.path.clone();
        let query = query.clone();
        run_blocking(move || Ok(load(&path)?.select(&query))).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        let table = table.to_string();
        let filters = filters.to_vec();
        self.mutate(move |tables| {
            let updated = tables.update(&table, &filters, &patch);
            let modified = !updated.is_empty();
            Ok((updated, modified))
        })
        .await
    }
}

impl std::fmt::Debug for JsonFileRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileRowStore")
            .field("path", &self.path)
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
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRowStore::open(dir.path().join("vault.json")).await.unwrap();
        assert!(store.select(&Query::table("processes")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vault.json");

        {
            let store = JsonFileRowStore::open(&path).await.unwrap();
            store.insert("v", row(json!({"id": "a", "n": 1}))).await.unwrap();
            store.insert("v", row(json!({"id": "b", "n": 2}))).await.unwrap();
            store
                .update("v", &[Filter::eq("id", "a")], row(json!({"status": "rejected"})))
                .await
                .unwrap();
        }

        let reopened = JsonFileRowStore::open(&path).await.unwrap();
        let rows = reopened
            .select(&Query::table("v").order_by(Order::desc("n")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "b");
        assert_eq!(rows[1]["status"], "rejected");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_insert_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRowStore::open(dir.path().join("vault.json")).await.unwrap();
        store.insert("v", row(json!({"id": "a"}))).await.unwrap();

        let err = store.insert("v", row(json!({"id": "a"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.select(&Query::table("v")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn handles_on_one_path_keep_each_others_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let first = JsonFileRowStore::open(&path).await.unwrap();
        let second = JsonFileRowStore::open(&path).await.unwrap();

        first.insert("v", row(json!({"id": "v1", "n": 1}))).await.unwrap();
        second.insert("v", row(json!({"id": "v2", "n": 2}))).await.unwrap();
        first
            .update("v", &[Filter::eq("id", "v2")], row(json!({"status": "approved"})))
            .await
            .unwrap();

        let reopened = JsonFileRowStore::open(&path).await.unwrap();
        let rows = reopened
            .select(&Query::table("v").order_by(Order::asc("n")))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert_eq!(rows[1]["status"], "approved");

        // A stale handle still sees writes made through another.
        assert_eq!(second.select(&Query::table("v")).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_handles_lose_no_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let mut tasks = Vec::new();
        for n in 0..16 {
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                let store = JsonFileRowStore::open(&path).await.unwrap();
                store.insert("v", row(json!({"n": n}))).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let store = JsonFileRowStore::open(&path).await.unwrap();
        assert_eq!(store.select(&Query::table("v")).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileRowStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptFile { .. }));
    }
}
