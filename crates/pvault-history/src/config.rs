use serde::{Deserialize, Serialize};

use pvault_diff::TrackedAttributes;
use pvault_types::VersionStatus;

use crate::error::{HistoryError, HistoryResult};

/// Configuration for the version history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Status stamped on new versions unless the caller supplies one.
    pub default_status: VersionStatus,
    /// Maximum number of entries returned by board-wide listings.
    pub board_page_size: usize,
    /// Serialize version creation per process inside this instance.
    pub serialize_creates: bool,
    /// Attributes compared when classifying an element as modified.
    pub tracked_attributes: TrackedAttributes,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_status: VersionStatus::Approved,
            board_page_size: 50,
            serialize_creates: true,
            tracked_attributes: TrackedAttributes::default(),
        }
    }
}

impl HistoryConfig {
    /// Configuration for teams with a review workflow: new versions start
    /// as drafts and must be moved through review explicitly.
    pub fn review_workflow() -> Self {
        Self {
            default_status: VersionStatus::Draft,
            ..Default::default()
        }
    }

    /// Parse a TOML configuration, rejecting a zero page size.
    pub fn from_toml_str(source: &str) -> HistoryResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| HistoryError::Config(e.to_string()))?;
        if config.board_page_size == 0 {
            return Err(HistoryError::Config("board_page_size must be at least 1".into()));
        }
        Ok(config)
    }
}
