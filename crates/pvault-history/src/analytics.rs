//! Board dashboard aggregates.

use std::fmt;

use serde::{Deserialize, Serialize};

use pvault_types::{Process, ProcessStatus};
use pvault_xml::ProcessMetrics;

/// Process counts per lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub draft: usize,
    pub pending_review: usize,
    pub published: usize,
}

impl StatusDistribution {
    fn record(&mut self, status: ProcessStatus) {
        match status {
            ProcessStatus::Draft => self.draft += 1,
            ProcessStatus::PendingReview => self.pending_review += 1,
            ProcessStatus::Published => self.published += 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardAnalytics {
    pub status_distribution: StatusDistribution,
    /// Mean complexity score over all processes, rounded half up.
    /// Processes without a diagram count as zero.
    pub avg_complexity: u32,
    pub total_processes: usize,
    pub total_duration_hours: u32,
}

impl BoardAnalytics {
    /// Aggregate the processes of a board.
    pub fn from_processes(processes: &[Process]) -> Self {
        let mut analytics = Self {
            total_processes: processes.len(),
            ..Default::default()
        };
        let mut total_complexity = 0u64;

        for process in processes {
            analytics.status_distribution.record(process.status);
            if let Some(xml) = process.bpmn_xml.as_deref() {
                let metrics = ProcessMetrics::from_xml(xml);
                total_complexity += u64::from(metrics.complexity_score);
                analytics.total_duration_hours += metrics.estimated_duration_hours;
            }
        }

        if !processes.is_empty() {
            let n = processes.len() as u64;
            analytics.avg_complexity = ((2 * total_complexity + n) / (2 * n)) as u32;
        }
        analytics
    }
}

impl fmt::Display for BoardAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.status_distribution;
        write!(
            f,
            "{} processes ({} draft, {} in review, {} published), avg complexity {}, {}h estimated",
            self.total_processes,
            d.draft,
            d.pending_review,
            d.published,
            self.avg_complexity,
            self.total_duration_hours
        )
    }
}

#[cfg(test)]
mod tests {
    use pvault_types::{BoardId, UserId};

    use super::*;

    fn process(status: ProcessStatus, xml: Option<&str>) -> Process {
        let mut p = Process::new(BoardId::new(), "P", UserId::new("u"));
        p.status = status;
        p.bpmn_xml = xml.map(str::to_string);
        p
    }

    #[test]
    fn aggregates_board() {
        // complexity 2*1 + 2 + 0.5*2 = 5, duration 4*2 + 1 = 9
        let busy = r#"<d><startEvent id="S"/><task id="A"/><userTask id="B"/><exclusiveGateway id="G"/><endEvent id="E"/></d>"#;
        // complexity 1, duration 4
        let small = r#"<d><task id="A"/></d>"#;

        let analytics = BoardAnalytics::from_processes(&[
            process(ProcessStatus::Draft, Some(busy)),
            process(ProcessStatus::Published, Some(small)),
            process(ProcessStatus::Draft, None),
        ]);

        assert_eq!(analytics.total_processes, 3);
        assert_eq!(analytics.status_distribution.draft, 2);
        assert_eq!(analytics.status_distribution.published, 1);
        assert_eq!(analytics.status_distribution.pending_review, 0);
        // 6 / 3 = 2
        assert_eq!(analytics.avg_complexity, 2);
        assert_eq!(analytics.total_duration_hours, 13);
    }

    #[test]
    fn average_rounds_half_up() {
        let one = r#"<d><task id="A"/></d>"#;
        let two = r#"<d><task id="A"/><task id="B"/></d>"#;
        let analytics = BoardAnalytics::from_processes(&[
            process(ProcessStatus::Draft, Some(one)),
            process(ProcessStatus::Draft, Some(two)),
        ]);
        // 3 / 2 = 1.5
        assert_eq!(analytics.avg_complexity, 2);
    }

    #[test]
    fn empty_board() {
        let analytics = BoardAnalytics::from_processes(&[]);
        assert_eq!(analytics, BoardAnalytics::default());
        assert!(analytics.to_string().starts_with("0 processes"));
    }
}
