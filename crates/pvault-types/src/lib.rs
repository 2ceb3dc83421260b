//! Foundation types for Process Vault.
//!
//! Every other `pvault` crate depends on `pvault-types`. The records here
//! mirror the persisted row layout, so their serde representation is the
//! wire format.
//!
//! # Key Types
//!
//! - [`ProcessId`] / [`VersionId`] / [`BoardId`]: UUID v7 identifiers
//! - [`UserId`]: opaque identifier issued by the external auth provider
//! - [`VersionStatus`]: review status of a version (`draft` … `rejected`)
//! - [`ProcessVersion`]: immutable, numbered snapshot of a process diagram
//! - [`Process`]: the externally owned process row holding the current pointer

pub mod error;
pub mod ids;
pub mod process;
pub mod status;
pub mod version;

pub use error::TypeError;
pub use ids::{BoardId, ProcessId, UserId, VersionId};
pub use process::{AuthorInfo, Process, Profile};
pub use status::{ProcessStatus, VersionStatus};
pub use version::{NewVersion, ProcessVersion, VersionEntry};
