use std::collections::HashSet;

use pvault_store::RowStore;
use pvault_types::{BoardId, ProcessId};

use crate::error::HistoryResult;
use crate::history::VersionHistory;

/// Result of validating one process history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub process: ProcessId,
    pub version_count: usize,
    pub numbers_unique: bool,
    pub sequence_contiguous: bool,
    pub timestamps_monotonic: bool,
    pub pointer_current: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if no check failed. Gaps are informational.
    pub fn is_valid(&self) -> bool {
        self.violations.iter().all(|v| v.kind.is_informational())
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub version_number: u32,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Two versions share a number (an unserialized concurrent save).
    DuplicateNumber,
    /// A number was skipped.
    SequenceGap,
    /// A higher-numbered version was created earlier than its predecessor.
    TimeRegression,
    /// The process row does not point at the highest-numbered version.
    StalePointer,
    /// A version numbered 0.
    ZeroNumber,
}

impl ViolationKind {
    /// Gaps are allowed by the data model (e.g. a failed insert after
    /// numbering) and do not make a history invalid.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::SequenceGap)
    }
}

/// Version history integrity validator.
pub struct HistoryValidator;

impl HistoryValidator {
    /// Validate a single process history for all invariants.
    pub async fn validate_process<S: RowStore>(
        history: &VersionHistory<S>,
        process: &ProcessId,
    ) -> HistoryResult<ValidationReport> {
        let versions = history.read_history(process).await?;
        let mut violations = Vec::new();
        let mut numbers_unique = true;
        let mut sequence_contiguous = true;
        let mut timestamps_monotonic = true;
        let mut seen = HashSet::new();

        for (index, version) in versions.iter().enumerate() {
            let number = version.version_number;
            if number == 0 {
                violations.push(Violation {
                    version_number: 0,
                    kind: ViolationKind::ZeroNumber,
                    description: "version numbers start at 1".into(),
                });
            }
            if !seen.insert(number) {
                numbers_unique = false;
                violations.push(Violation {
                    version_number: number,
                    kind: ViolationKind::DuplicateNumber,
                    description: format!("version number {number} assigned more than once"),
                });
                continue;
            }

            let Some(previous) = index.checked_sub(1).map(|i| &versions[i]) else {
                if number > 1 {
                    sequence_contiguous = false;
                    violations.push(Violation {
                        version_number: number,
                        kind: ViolationKind::SequenceGap,
                        description: format!("history starts at {number}, expected 1"),
                    });
                }
                continue;
            };

            if number != previous.version_number + 1 {
                sequence_contiguous = false;
                violations.push(Violation {
                    version_number: number,
                    kind: ViolationKind::SequenceGap,
                    description: format!(
                        "expected version {}, got {number}",
                        previous.version_number + 1
                    ),
                });
            }
            if version.created_at < previous.created_at {
                timestamps_monotonic = false;
                violations.push(Violation {
                    version_number: number,
                    kind: ViolationKind::TimeRegression,
                    description: format!(
                        "created at {} before version {} at {}",
                        version.created_at, previous.version_number, previous.created_at
                    ),
                });
            }
        }

        let mut pointer_current = true;
        if let (Some(latest), Some(row)) = (versions.last(), history.get_process(process).await?) {
            if row.current_version_id != Some(latest.id) {
                pointer_current = false;
                violations.push(Violation {
                    version_number: latest.version_number,
                    kind: ViolationKind::StalePointer,
                    description: format!(
                        "process points at version {}, latest is {}",
                        row.version,
                        latest.version_number
                    ),
                });
            }
        }

        Ok(ValidationReport {
            process: *process,
            version_count: versions.len(),
            numbers_unique,
            sequence_contiguous,
            timestamps_monotonic,
            pointer_current,
            violations,
        })
    }

    /// Validate every process, or every process of one board.
    pub async fn validate_all<S: RowStore>(
        history: &VersionHistory<S>,
        board: Option<&BoardId>,
    ) -> HistoryResult<Vec<ValidationReport>> {
        let processes = history.processes(board).await?;
        let mut reports = Vec::with_capacity(processes.len());
        for process in &processes {
            reports.push(Self::validate_process(history, &process.id).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pvault_store::{to_row, InMemoryRowStore};
    use pvault_types::{NewVersion, Process, ProcessVersion, UserId, VersionId};

    use crate::tables::{PROCESSES, VERSIONS};

    use super::*;

    fn author() -> UserId {
        UserId::new("user-ana")
    }

    async fn with_process() -> (VersionHistory<InMemoryRowStore>, ProcessId) {
        let history = VersionHistory::new(InMemoryRowStore::new());
        let process = Process::new(BoardId::new(), "P", author());
        history
            .store()
            .insert(PROCESSES, to_row(&process).unwrap())
            .await
            .unwrap();
        (history, process.id)
    }

    /// Write a version row directly, bypassing numbering.
    async fn raw_version(
        history: &VersionHistory<InMemoryRowStore>,
        process: ProcessId,
        number: u32,
        offset_secs: i64,
    ) {
        let version = ProcessVersion {
            id: VersionId::new(),
            process_id: process,
            bpmn_xml: Some("<definitions/>".into()),
            version_number: number,
            comment: None,
            status: Default::default(),
            created_by: author(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            thumbnail_svg: None,
        };
        history
            .store()
            .insert(VERSIONS, to_row(&version).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn valid_history() {
        let (history, pid) = with_process().await;
        for _ in 0..3 {
            history
                .create_version(NewVersion::new(pid, "<definitions/>", author()))
                .await
                .unwrap();
        }

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(report.is_valid());
        assert_eq!(report.version_count, 3);
        assert!(report.numbers_unique);
        assert!(report.pointer_current);
    }

    #[tokio::test]
    async fn empty_history_is_valid() {
        let (history, pid) = with_process().await;
        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(report.is_valid());
        assert_eq!(report.version_count, 0);
    }

    #[tokio::test]
    async fn detects_duplicate_numbers() {
        let (history, pid) = with_process().await;
        raw_version(&history, pid, 1, 0).await;
        raw_version(&history, pid, 1, 1).await;

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(!report.numbers_unique);
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DuplicateNumber && v.version_number == 1));
    }

    #[tokio::test]
    async fn detects_gaps_and_time_regressions() {
        let (history, pid) = with_process().await;
        raw_version(&history, pid, 1, 10).await;
        raw_version(&history, pid, 3, 0).await;

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(!report.sequence_contiguous);
        assert!(!report.timestamps_monotonic);
        let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::SequenceGap));
        assert!(kinds.contains(&ViolationKind::TimeRegression));
    }

    #[tokio::test]
    async fn gaps_alone_are_informational() {
        let (history, pid) = with_process().await;
        history
            .create_version(NewVersion::new(pid, "<definitions/>", author()))
            .await
            .unwrap();
        raw_version(&history, pid, 3, 5).await;
        let latest = history.latest_version(&pid).await.unwrap().unwrap();
        let mut patch = pvault_store::Row::new();
        patch.insert("current_version_id".into(), latest.id.to_string().into());
        history
            .store()
            .update(PROCESSES, &[pvault_store::Filter::eq("id", pid.to_string())], patch)
            .await
            .unwrap();

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(!report.sequence_contiguous);
        assert_eq!(report.violations.len(), 1);
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn detects_zero_number() {
        let (history, pid) = with_process().await;
        raw_version(&history, pid, 0, 0).await;

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.violations[0].kind, ViolationKind::ZeroNumber);
    }

    #[tokio::test]
    async fn detects_stale_pointer() {
        let (history, pid) = with_process().await;
        history
            .create_version(NewVersion::new(pid, "<definitions/>", author()))
            .await
            .unwrap();
        raw_version(&history, pid, 2, 5).await;

        let report = HistoryValidator::validate_process(&history, &pid).await.unwrap();
        assert!(!report.pointer_current);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::StalePointer);
    }

    #[tokio::test]
    async fn validate_all_covers_board() {
        let (history, pid) = with_process().await;
        raw_version(&history, pid, 2, 0).await;

        let reports = HistoryValidator::validate_all(&history, None).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].is_valid());

        let other = HistoryValidator::validate_all(&history, Some(&BoardId::new()))
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
