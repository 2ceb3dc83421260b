//! The version history over a row store.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::Value;

use pvault_diff::{DiffResult, SemanticDiffer};
use pvault_store::{from_row, to_row, Filter, Order, Query, Row, RowStore, StoreResult};
use pvault_types::{
    AuthorInfo, BoardId, NewVersion, Process, ProcessId, ProcessVersion, Profile, TypeError,
    UserId, VersionEntry, VersionId, VersionStatus,
};

use crate::clock::MonotonicClock;
use crate::config::HistoryConfig;
use crate::error::{HistoryError, HistoryResult};
use crate::locks::ProcessLocks;
use crate::tables::{columns, PROCESSES, PROFILES, VERSIONS};

/// Append-only version history for every process in a store.
///
/// Versions are numbered 1, 2, 3, … per process. Once written, a version
/// never changes except for its review status. Restoring an old version
/// appends a new one carrying the old snapshot.
pub struct VersionHistory<S> {
    store: S,
    config: HistoryConfig,
    differ: SemanticDiffer,
    locks: ProcessLocks,
    clock: MonotonicClock,
}

/// The two columns of a process row needed for board listings.
#[derive(Deserialize)]
struct ProcessTitle {
    id: ProcessId,
    title: String,
}

impl<S: RowStore> VersionHistory<S> {
    /// Create a history over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, HistoryConfig::default())
    }

    /// Create a history over `store`. A zero `board_page_size` is raised to 1.
    pub fn with_config(store: S, mut config: HistoryConfig) -> Self {
        if config.board_page_size == 0 {
            tracing::warn!("board_page_size of 0 raised to 1");
            config.board_page_size = 1;
        }
        Self {
            store,
            differ: SemanticDiffer::new(config.tracked_attributes.clone()),
            config,
            locks: ProcessLocks::new(),
            clock: MonotonicClock::new(),
        }
    }

    /// The underlying row store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // --- Writes ---

    /// Persist a new numbered snapshot and move the process pointer to it.
    ///
    /// The number is one past the highest existing number for the process.
    /// If the snapshot is saved but the pointer update fails, the error is
    /// [`HistoryError::StalePointer`] and carries the saved version.
    pub async fn create_version(&self, new: NewVersion) -> HistoryResult<ProcessVersion> {
        let process = new.process_id;
        let _guard = if self.config.serialize_creates {
            Some(self.locks.acquire(&process).await)
        } else {
            None
        };

        let number = self.max_version_number(&process).await? + 1;
        let version = new.into_version(number, self.config.default_status, self.clock.now())?;
        self.store.insert(VERSIONS, to_row(&version)?).await?;
        tracing::debug!(process = %process, version = version.version_number, "created process version");

        if let Err(source) = self.advance_pointer(&version).await {
            tracing::warn!(
                process = %process,
                version = version.version_number,
                error = %source,
                "version saved but process pointer not updated"
            );
            return Err(HistoryError::StalePointer {
                version: Box::new(version),
                source,
            });
        }
        Ok(version)
    }

    /// Append a new version whose snapshot is a copy of `target`.
    pub async fn restore(
        &self,
        process: &ProcessId,
        target: &VersionId,
        author: UserId,
    ) -> HistoryResult<ProcessVersion> {
        let source = self.get_version(target).await?;
        if source.process_id != *process {
            return Err(HistoryError::ForeignVersion {
                version: *target,
                owner: source.process_id,
                process: *process,
            });
        }

        let new = NewVersion {
            process_id: *process,
            bpmn_xml: source.bpmn_xml,
            comment: Some(format!("Restored from version {}", source.version_number)),
            author,
            thumbnail_svg: source.thumbnail_svg,
            status: None,
        };
        self.create_version(new).await
    }

    /// Change the review status of a version. Any transition is accepted.
    pub async fn update_status(
        &self,
        version: &VersionId,
        status: VersionStatus,
    ) -> HistoryResult<ProcessVersion> {
        let mut patch = Row::new();
        patch.insert(columns::STATUS.into(), Value::from(status.as_str()));

        let updated = self
            .store
            .update(VERSIONS, &[Filter::eq(columns::ID, version.to_string())], patch)
            .await?;
        let row = updated
            .into_iter()
            .next()
            .ok_or(HistoryError::VersionNotFound(*version))?;
        tracing::debug!(version = %version, status = %status, "updated version status");
        Ok(from_row(row)?)
    }

    // --- Reads ---

    /// The version with this id.
    pub async fn get_version(&self, id: &VersionId) -> HistoryResult<ProcessVersion> {
        let query = Query::table(VERSIONS).filter(Filter::eq(columns::ID, id.to_string()));
        let row = self
            .store
            .select_one(&query)
            .await?
            .ok_or(HistoryError::VersionNotFound(*id))?;
        Ok(from_row(row)?)
    }

    /// The version of a process with this number.
    pub async fn version_by_number(
        &self,
        process: &ProcessId,
        number: u32,
    ) -> HistoryResult<ProcessVersion> {
        let query = Query::table(VERSIONS)
            .filter(Filter::eq(columns::PROCESS_ID, process.to_string()))
            .filter(Filter::eq(columns::VERSION_NUMBER, number));
        let row = self.store.select_one(&query).await?.ok_or(
            HistoryError::VersionNumberNotFound {
                process: *process,
                number,
            },
        )?;
        Ok(from_row(row)?)
    }

    /// The highest-numbered version of a process.
    pub async fn latest_version(&self, process: &ProcessId) -> HistoryResult<Option<ProcessVersion>> {
        let query = Query::table(VERSIONS)
            .filter(Filter::eq(columns::PROCESS_ID, process.to_string()))
            .order_by(Order::desc(columns::VERSION_NUMBER));
        match self.store.select_one(&query).await? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Every version of a process in ascending number order.
    ///
    /// Unlike [`list_versions`](Self::list_versions), errors and undecodable
    /// rows are reported rather than skipped.
    pub async fn read_history(&self, process: &ProcessId) -> HistoryResult<Vec<ProcessVersion>> {
        let query = Query::table(VERSIONS)
            .filter(Filter::eq(columns::PROCESS_ID, process.to_string()))
            .order_by(Order::asc(columns::VERSION_NUMBER));
        let rows = self.store.select(&query).await?;
        rows.into_iter()
            .map(|row| from_row(row).map_err(HistoryError::from))
            .collect()
    }

    /// Versions of a process, newest number first, with author details.
    ///
    /// A failing store yields an empty list and a warning.
    pub async fn list_versions(&self, process: &ProcessId) -> Vec<VersionEntry> {
        match self.try_list_versions(process).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(process = %process, error = %e, "failed to list versions");
                Vec::new()
            }
        }
    }

    /// Like [`list_versions`](Self::list_versions), but store errors are returned.
    pub async fn try_list_versions(&self, process: &ProcessId) -> HistoryResult<Vec<VersionEntry>> {
        let query = Query::table(VERSIONS)
            .filter(Filter::eq(columns::PROCESS_ID, process.to_string()))
            .order_by(Order::desc(columns::VERSION_NUMBER));
        let versions = decode_versions(self.store.select(&query).await?);
        Ok(self.attach_authors(versions).await)
    }

    /// Recent versions across all processes of a board, newest first.
    ///
    /// Capped at the configured page size. A failing store yields an empty
    /// list and a warning.
    pub async fn list_board_versions(&self, board: &BoardId) -> Vec<VersionEntry> {
        match self.try_list_board_versions(board).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(board = %board, error = %e, "failed to list board versions");
                Vec::new()
            }
        }
    }

    /// Like [`list_board_versions`](Self::list_board_versions), but store
    /// errors are returned.
    pub async fn try_list_board_versions(&self, board: &BoardId) -> HistoryResult<Vec<VersionEntry>> {
        let query = Query::table(PROCESSES).filter(Filter::eq(columns::BOARD_ID, board.to_string()));
        let mut titles = HashMap::new();
        for row in self.store.select(&query).await? {
            match from_row::<ProcessTitle>(row) {
                Ok(p) => {
                    titles.insert(p.id, p.title);
                }
                Err(e) => tracing::warn!(board = %board, error = %e, "skipping undecodable process row"),
            }
        }
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = titles.keys().map(ToString::to_string).collect();
        let query = Query::table(VERSIONS)
            .filter(Filter::one_of(columns::PROCESS_ID, ids))
            .order_by(Order::desc(columns::CREATED_AT))
            .limit(self.config.board_page_size);
        let versions = decode_versions(self.store.select(&query).await?);

        let mut entries = self.attach_authors(versions).await;
        for entry in &mut entries {
            entry.process_title = titles.get(&entry.version.process_id).cloned();
        }
        Ok(entries)
    }

    /// The process row, if the application has created one.
    pub async fn get_process(&self, id: &ProcessId) -> HistoryResult<Option<Process>> {
        let query = Query::table(PROCESSES).filter(Filter::eq(columns::ID, id.to_string()));
        match self.store.select_one(&query).await? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Process rows, optionally restricted to one board, oldest first.
    pub async fn processes(&self, board: Option<&BoardId>) -> HistoryResult<Vec<Process>> {
        let mut query = Query::table(PROCESSES).order_by(Order::asc(columns::CREATED_AT));
        if let Some(board) = board {
            query = query.filter(Filter::eq(columns::BOARD_ID, board.to_string()));
        }
        let rows = self.store.select(&query).await?;
        rows.into_iter()
            .map(|row| from_row(row).map_err(HistoryError::from))
            .collect()
    }

    /// Semantic diff from version `old` to version `new`.
    pub async fn compare_versions(&self, old: &VersionId, new: &VersionId) -> HistoryResult<DiffResult> {
        let old = self.get_version(old).await?;
        let new = self.get_version(new).await?;
        Ok(self
            .differ
            .diff_snapshots(old.bpmn_xml.as_deref(), new.bpmn_xml.as_deref()))
    }

    // --- Internals ---

    /// Highest stored number for the process, checking every row: a row
    /// read as zero would let the next create reuse a number.
    async fn max_version_number(&self, process: &ProcessId) -> HistoryResult<u32> {
        let query =
            Query::table(VERSIONS).filter(Filter::eq(columns::PROCESS_ID, process.to_string()));

        let mut max = 0;
        for row in self.store.select(&query).await? {
            let value = row.get(columns::VERSION_NUMBER).unwrap_or(&Value::Null);
            let Some(number) = value.as_i64() else {
                return Err(HistoryError::CorruptNumbering {
                    process: *process,
                    value: value.to_string(),
                });
            };
            let number =
                u32::try_from(number).map_err(|_| TypeError::InvalidVersionNumber(number))?;
            max = max.max(number);
        }
        Ok(max)
    }

    async fn advance_pointer(&self, version: &ProcessVersion) -> StoreResult<()> {
        let mut patch = Row::new();
        patch.insert(columns::CURRENT_VERSION_ID.into(), Value::from(version.id.to_string()));
        patch.insert(columns::VERSION.into(), Value::from(version.version_number));
        patch.insert(
            columns::BPMN_XML.into(),
            version.bpmn_xml.clone().map_or(Value::Null, Value::from),
        );
        patch.insert(columns::UPDATED_AT.into(), Value::from(version.created_at.to_rfc3339()));

        let filters = [Filter::eq(columns::ID, version.process_id.to_string())];
        let updated = self.store.update(PROCESSES, &filters, patch).await?;
        if updated.is_empty() {
            tracing::warn!(process = %version.process_id, "no process row to point at new version");
        }
        Ok(())
    }

    /// Join profile rows onto versions. Profile lookup failures leave the
    /// author unset.
    async fn attach_authors(&self, versions: Vec<ProcessVersion>) -> Vec<VersionEntry> {
        let user_ids: BTreeSet<String> = versions.iter().map(|v| v.created_by.to_string()).collect();
        let mut authors: HashMap<UserId, AuthorInfo> = HashMap::new();

        if !user_ids.is_empty() {
            let query = Query::table(PROFILES).filter(Filter::one_of(columns::ID, user_ids));
            match self.store.select(&query).await {
                Ok(rows) => {
                    for profile in rows.into_iter().filter_map(|row| from_row::<Profile>(row).ok()) {
                        authors.insert(profile.id.clone(), profile.into());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to load author profiles"),
            }
        }

        versions
            .into_iter()
            .map(|version| {
                let mut entry = VersionEntry::new(version);
                entry.author = authors.get(&entry.version.created_by).cloned();
                entry
            })
            .collect()
    }
}

fn decode_versions(rows: Vec<Row>) -> Vec<ProcessVersion> {
    rows.into_iter()
        .filter_map(|row| match from_row(row) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable version row");
                None
            }
        })
        .collect()
}
