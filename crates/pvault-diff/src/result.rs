use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How an element changed between two documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// Per-element detail record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Names of the tracked attributes that differ (modifications only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
}

impl ChangeDetail {
    /// Detail for an added element.
    pub fn added() -> Self {
        Self {
            kind: ChangeKind::Added,
            changes: None,
        }
    }

    /// Detail for a removed element.
    pub fn removed() -> Self {
        Self {
            kind: ChangeKind::Removed,
            changes: None,
        }
    }

    /// Detail for a modified element and the attributes that changed.
    pub fn modified(changes: Vec<String>) -> Self {
        Self {
            kind: ChangeKind::Modified,
            changes: Some(changes),
        }
    }
}

/// The result of comparing two documents.
///
/// `added`, `removed` and `modified` are disjoint and sorted. Together with
/// `unchanged` they cover every identifier of either document exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub details: BTreeMap<String, ChangeDetail>,
    /// Identifiers present on both sides with equal tracked attributes.
    #[serde(skip)]
    pub unchanged: Vec<String>,
}

impl DiffResult {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing was added, removed or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Number of changed elements.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Classification of an identifier; `None` if unchanged or unknown.
    pub fn classify(&self, id: &str) -> Option<ChangeKind> {
        self.details.get(id).map(|d| d.kind)
    }

    /// Counts per classification.
    pub fn stats(&self) -> DiffStats {
        DiffStats {
            added: self.added.len(),
            removed: self.removed.len(),
            modified: self.modified.len(),
            unchanged: self.unchanged.len(),
        }
    }

    pub(crate) fn record_added(&mut self, id: &str) {
        self.added.push(id.to_string());
        self.details.insert(id.to_string(), ChangeDetail::added());
    }

    pub(crate) fn record_removed(&mut self, id: &str) {
        self.removed.push(id.to_string());
        self.details.insert(id.to_string(), ChangeDetail::removed());
    }

    pub(crate) fn record_modified(&mut self, id: &str, changes: Vec<String>) {
        self.modified.push(id.to_string());
        self.details.insert(id.to_string(), ChangeDetail::modified(changes));
    }
}

/// Summary counts, as rendered in diff legends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} -{} ~{} ({} unchanged)",
            self.added, self.removed, self.modified, self.unchanged
        )
    }
}
