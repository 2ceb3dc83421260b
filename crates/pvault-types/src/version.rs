use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{ProcessId, UserId, VersionId};
use crate::process::AuthorInfo;
use crate::status::VersionStatus;

/// An immutable, numbered snapshot of a process diagram.
///
/// Created exactly once at save time. The only permitted mutation after
/// creation is a change of `status`. The serde layout is the persisted row
/// layout of the `process_versions` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessVersion {
    pub id: VersionId,
    pub process_id: ProcessId,
    /// Serialized BPMN XML. `None` only for a process created without a diagram.
    pub bpmn_xml: Option<String>,
    /// 1-based, strictly increasing within a process.
    pub version_number: u32,
    pub comment: Option<String>,
    pub status: VersionStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_svg: Option<String>,
}

impl ProcessVersion {
    /// Short label used in logs and CLI output, e.g. `v3`.
    pub fn label(&self) -> String {
        format!("v{}", self.version_number)
    }

    /// The snapshot as a string slice (absent snapshot reads as empty).
    pub fn xml(&self) -> &str {
        self.bpmn_xml.as_deref().unwrap_or_default()
    }
}

/// Caller input for creating a version.
///
/// The version number, identifier and timestamp are assigned by the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVersion {
    pub process_id: ProcessId,
    pub bpmn_xml: Option<String>,
    pub comment: Option<String>,
    pub author: UserId,
    pub thumbnail_svg: Option<String>,
    /// Overrides the configured default status when set.
    pub status: Option<VersionStatus>,
}

impl NewVersion {
    /// Input for a new version with no comment, thumbnail or explicit status.
    pub fn new(process_id: ProcessId, bpmn_xml: impl Into<String>, author: UserId) -> Self {
        Self {
            process_id,
            bpmn_xml: Some(bpmn_xml.into()),
            comment: None,
            author,
            thumbnail_svg: None,
            status: None,
        }
    }

    /// Attach a change comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach an SVG thumbnail.
    pub fn with_thumbnail(mut self, svg: impl Into<String>) -> Self {
        self.thumbnail_svg = Some(svg.into());
        self
    }

    /// Override the configured initial status.
    pub fn with_status(mut self, status: VersionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Assemble the immutable record once the number has been assigned.
    pub fn into_version(
        self,
        version_number: u32,
        default_status: VersionStatus,
        created_at: DateTime<Utc>,
    ) -> Result<ProcessVersion, TypeError> {
        if version_number == 0 {
            return Err(TypeError::InvalidVersionNumber(0));
        }
        Ok(ProcessVersion {
            id: VersionId::new(),
            process_id: self.process_id,
            bpmn_xml: self.bpmn_xml,
            version_number,
            comment: self.comment,
            status: self.status.unwrap_or(default_status),
            created_by: self.author,
            created_at,
            thumbnail_svg: self.thumbnail_svg,
        })
    }
}

/// A version as presented in history listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    #[serde(flatten)]
    pub version: ProcessVersion,
    #[serde(rename = "created_by_user", skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_title: Option<String>,
}

impl VersionEntry {
    /// Wrap a version with no author details.
    pub fn new(version: ProcessVersion) -> Self {
        Self {
            version,
            author: None,
            process_title: None,
        }
    }

    /// Author display name, falling back to the raw user identifier.
    pub fn author_display(&self) -> String {
        match &self.author {
            Some(info) if !info.full_name.is_empty() => info.full_name.clone(),
            Some(info) if !info.email.is_empty() => info.email.clone(),
            _ => self.version.created_by.to_string(),
        }
    }
}
