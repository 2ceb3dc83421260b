//! Heuristic size and complexity metrics for dashboards.
//!
//! Derived and non-authoritative: nothing in the version history depends on
//! these numbers.

use serde::{Deserialize, Serialize};

use crate::document::{parse_document, XmlNode};

const TASKS: &[&str] = &["task", "userTask", "serviceTask", "sendTask", "receiveTask"];

const GATEWAYS: &[&str] = &[
    "exclusiveGateway",
    "parallelGateway",
    "inclusiveGateway",
    "complexGateway",
    "eventBasedGateway",
];

const EVENTS: &[&str] = &[
    "startEvent",
    "endEvent",
    "intermediateCatchEvent",
    "intermediateThrowEvent",
];

/// Hours assumed per task when estimating duration.
const HOURS_PER_TASK: u32 = 4;
/// Hours of overhead assumed per gateway.
const HOURS_PER_GATEWAY: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub total_elements: u32,
    pub tasks: u32,
    pub gateways: u32,
    pub events: u32,
    pub complexity_score: u32,
    pub estimated_duration_hours: u32,
}

impl ProcessMetrics {
    /// Compute metrics for a document. Empty or malformed input yields zeros.
    pub fn from_xml(xml: &str) -> Self {
        if xml.trim().is_empty() {
            return Self::default();
        }
        match parse_document(xml) {
            Ok(root) => Self::from_document(&root),
            Err(e) => {
                tracing::warn!(error = %e, "cannot compute metrics for malformed document");
                Self::default()
            }
        }
    }

    /// Compute metrics from a parsed document.
    pub fn from_document(root: &XmlNode) -> Self {
        let (mut tasks, mut gateways, mut events) = (0u32, 0u32, 0u32);
        for node in root.descendants() {
            let name = node.local_name();
            if TASKS.contains(&name) {
                tasks += 1;
            } else if GATEWAYS.contains(&name) {
                gateways += 1;
            } else if EVENTS.contains(&name) {
                events += 1;
            }
        }
        Self::from_counts(tasks, gateways, events)
    }

    /// Score = 2·gateways + tasks + 0.5·events, rounded half up.
    pub fn from_counts(tasks: u32, gateways: u32, events: u32) -> Self {
        let doubled = 4 * gateways + 2 * tasks + events;
        Self {
            total_elements: tasks + gateways + events,
            tasks,
            gateways,
            events,
            complexity_score: doubled.div_ceil(2),
            estimated_duration_hours: tasks * HOURS_PER_TASK + gateways * HOURS_PER_GATEWAY,
        }
    }
}
