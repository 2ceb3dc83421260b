use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Review status of a process version.
///
/// Transitions are unrestricted: any status may be replaced by any other,
/// including `Approved → Draft`. Whether new versions start as `Draft` or
/// are auto-stamped `Approved` is a caller policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl VersionStatus {
    pub const ALL: [VersionStatus; 4] = [
        VersionStatus::Draft,
        VersionStatus::Pending,
        VersionStatus::Approved,
        VersionStatus::Rejected,
    ];

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Default for VersionStatus {
    fn default() -> Self {
        Self::Approved
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Publication status of a process (owned by the process row, not the core).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Draft,
    PendingReview,
    Published,
}

impl Default for ProcessStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::PendingReview => write!(f, "pending_review"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl FromStr for ProcessStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(Self::Draft),
            "pending_review" => Ok(Self::PendingReview),
            "published" => Ok(Self::Published),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Approved".parse::<VersionStatus>().unwrap(), VersionStatus::Approved);
        assert_eq!(" pending ".parse::<VersionStatus>().unwrap(), VersionStatus::Pending);
    }

    #[test]
    fn parse_unknown_status() {
        let err = "archived".parse::<VersionStatus>().unwrap_err();
        assert_eq!(err, TypeError::UnknownStatus("archived".into()));
    }

    #[test]
    fn display_matches_wire_format() {
        for status in VersionStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn process_status_parse() {
        assert_eq!("pending-review".parse::<ProcessStatus>().unwrap(), ProcessStatus::PendingReview);
        assert!("archived".parse::<ProcessStatus>().is_err());
    }

    #[test]
    fn process_status_snake_case() {
        let json = serde_json::to_string(&ProcessStatus::PendingReview).unwrap();
        assert_eq!(json, "\"pending_review\"");
    }
}
