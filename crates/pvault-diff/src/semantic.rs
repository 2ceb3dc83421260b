//! Element-level semantic diff between two process documents.

use pvault_xml::ElementIndex;

use crate::result::DiffResult;
use crate::tracked::TrackedAttributes;

/// A differ configured with the set of tracked attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticDiffer {
    tracked: TrackedAttributes,
}

impl SemanticDiffer {
    /// A differ comparing the given attributes.
    pub fn new(tracked: TrackedAttributes) -> Self {
        Self { tracked }
    }

    /// The attributes compared.
    pub fn tracked(&self) -> &TrackedAttributes {
        &self.tracked
    }

    /// Diff two serialized documents. Malformed input on either side is
    /// indexed as empty; this never fails.
    pub fn diff(&self, old_xml: &str, new_xml: &str) -> DiffResult {
        diff_indexes(
            &ElementIndex::from_xml(old_xml),
            &ElementIndex::from_xml(new_xml),
            &self.tracked,
        )
    }

    /// Diff two optional snapshots; an absent snapshot is an empty document.
    pub fn diff_snapshots(&self, old_xml: Option<&str>, new_xml: Option<&str>) -> DiffResult {
        diff_indexes(
            &ElementIndex::from_snapshot(old_xml),
            &ElementIndex::from_snapshot(new_xml),
            &self.tracked,
        )
    }

    /// Diff two prebuilt indexes.
    pub fn diff_indexes(&self, old: &ElementIndex, new: &ElementIndex) -> DiffResult {
        diff_indexes(old, new, &self.tracked)
    }
}

/// Diff two documents tracking only the display name.
pub fn compare_documents(old_xml: &str, new_xml: &str) -> DiffResult {
    SemanticDiffer::default().diff(old_xml, new_xml)
}

/// Classify every identifier of `old` ∪ `new`.
///
/// - only in `new` → added
/// - only in `old` → removed
/// - in both, some tracked attribute differs → modified
/// - in both, tracked attributes equal → unchanged
pub fn diff_indexes(
    old: &ElementIndex,
    new: &ElementIndex,
    tracked: &TrackedAttributes,
) -> DiffResult {
    let mut result = DiffResult::new();

    // Added, modified and unchanged.
    for element in new.iter() {
        match old.get(&element.id) {
            None => result.record_added(&element.id),
            Some(previous) => {
                let changes = tracked.changed(previous, element);
                if changes.is_empty() {
                    result.unchanged.push(element.id.clone());
                } else {
                    result.record_modified(&element.id, changes);
                }
            }
        }
    }

    // Removed.
    for id in old.ids() {
        if !new.contains(id) {
            result.record_removed(id);
        }
    }

    result
}
