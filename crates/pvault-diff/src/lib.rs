//! Semantic diff engine for Process Vault.
//!
//! Compares two process documents by element identifier and classifies each
//! identifier as added, removed, modified or unchanged. The comparison is
//! set-based, not tree-structural: an element present on both sides counts
//! as modified only when one of the tracked attributes differs. Children,
//! ordering and untracked attributes are ignored.
//!
//! # Key Types
//!
//! - [`SemanticDiffer`] -- configured differ (tracked attribute set)
//! - [`DiffResult`] / [`ChangeDetail`] / [`ChangeKind`] -- the wire-format result
//! - [`TrackedAttributes`] -- attributes whose change marks an element modified

pub mod result;
pub mod semantic;
pub mod tracked;

pub use result::{ChangeDetail, ChangeKind, DiffResult, DiffStats};
pub use semantic::{compare_documents, diff_indexes, SemanticDiffer};
pub use tracked::TrackedAttributes;
