use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BoardId, ProcessId, UserId, VersionId};
use crate::status::ProcessStatus;

/// A process row. Owned by the surrounding application; the version
/// history only maintains `current_version_id`, `version` and `bpmn_xml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Denormalized copy of the current version's XML.
    #[serde(default)]
    pub bpmn_xml: Option<String>,
    #[serde(default)]
    pub status: ProcessStatus,
    #[serde(default)]
    pub current_version_id: Option<VersionId>,
    /// Denormalized current version number (0 before the first save).
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub responsible_role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl Process {
    /// A new process with no versions yet.
    pub fn new(board_id: BoardId, title: impl Into<String>, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ProcessId::new(),
            board_id,
            title: title.into(),
            description: None,
            bpmn_xml: None,
            status: ProcessStatus::Draft,
            current_version_id: None,
            version: 0,
            tags: Vec::new(),
            responsible_role: None,
            department: None,
            created_at: now,
            updated_at: now,
            created_by,
        }
    }
}

/// A user profile row, joined into version listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// Author display information attached to a listed version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub full_name: String,
    pub email: String,
}

impl From<Profile> for AuthorInfo {
    fn from(profile: Profile) -> Self {
        Self {
            full_name: profile.full_name,
            email: profile.email,
        }
    }
}
