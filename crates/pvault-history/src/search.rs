//! Process search over titles, descriptions, tags and diagram content.

use serde::{Deserialize, Serialize};

use pvault_types::{Process, ProcessId, ProcessStatus};
use pvault_xml::find_named_element;

/// Which field of a process matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Description,
    Tag,
    Content,
}

/// Structured narrowing applied before the text query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub status: Option<ProcessStatus>,
    /// Exact tag.
    pub tag: Option<String>,
    /// Case-insensitive substring of the responsible role.
    pub responsible_role: Option<String>,
    /// Case-insensitive substring of the department.
    pub department: Option<String>,
}

impl SearchFilters {
    /// Returns `true` if the process satisfies every set filter.
    pub fn matches(&self, process: &Process) -> bool {
        if self.status.is_some_and(|s| s != process.status) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !process.tags.contains(tag) {
                return false;
            }
        }
        contains_opt(process.responsible_role.as_deref(), self.responsible_role.as_deref())
            && contains_opt(process.department.as_deref(), self.department.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub process_id: ProcessId,
    pub title: String,
    pub matched: MatchField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Search processes, returning hits in input order.
///
/// A diagram content match takes precedence over a title match because its
/// snippet says where in the diagram the text was found. An empty query
/// returns every process that passes the filters.
pub fn search_processes(processes: &[Process], query: &str, filters: &SearchFilters) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    processes
        .iter()
        .filter(|p| filters.matches(p))
        .filter_map(|p| {
            let (matched, snippet) = if needle.is_empty() {
                (MatchField::Title, None)
            } else {
                match_process(p, &needle)?
            };
            Some(SearchHit {
                process_id: p.id,
                title: p.title.clone(),
                matched,
                snippet,
            })
        })
        .collect()
}

fn match_process(process: &Process, needle: &str) -> Option<(MatchField, Option<String>)> {
    let content = process
        .bpmn_xml
        .as_deref()
        .and_then(|xml| find_named_element(xml, needle))
        .map(|m| (MatchField::Content, Some(m.snippet())));

    if process.title.to_lowercase().contains(needle) {
        return content.or(Some((MatchField::Title, None)));
    }
    if let Some(description) = &process.description {
        if description.to_lowercase().contains(needle) {
            return Some((MatchField::Description, Some(description.clone())));
        }
    }
    if process.tags.iter().any(|t| t.to_lowercase().contains(needle)) {
        return Some((MatchField::Tag, None));
    }
    content
}

fn contains_opt(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.to_lowercase().contains(&wanted.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use pvault_types::{BoardId, UserId};

    use super::*;

    fn process(title: &str) -> Process {
        Process::new(BoardId::new(), title, UserId::new("u"))
    }

    #[test]
    fn matches_each_field() {
        let mut described = process("Onboarding");
        described.description = Some("Collect invoice details".into());
        let mut tagged = process("Payroll");
        tagged.tags = vec!["Invoice".into()];
        let mut drawn = process("Accounts");
        drawn.bpmn_xml = Some(r#"<d><userTask id="T1" name="Approve invoice"/></d>"#.into());
        let titled = process("Invoice intake");
        let unrelated = process("Hiring");

        let hits = search_processes(
            &[described, tagged, drawn, titled, unrelated],
            "INVOICE",
            &SearchFilters::default(),
        );
        let fields: Vec<MatchField> = hits.iter().map(|h| h.matched).collect();
        assert_eq!(
            fields,
            vec![MatchField::Description, MatchField::Tag, MatchField::Content, MatchField::Title]
        );
        assert_eq!(hits[0].snippet.as_deref(), Some("Collect invoice details"));
        assert_eq!(hits[2].snippet.as_deref(), Some("Found in userTask: \"Approve invoice\""));
    }

    #[test]
    fn content_beats_title() {
        let mut p = process("Invoice flow");
        p.bpmn_xml = Some(r#"<d><task id="T" name="Check invoice"/></d>"#.into());
        let hits = search_processes(&[p], "invoice", &SearchFilters::default());
        assert_eq!(hits[0].matched, MatchField::Content);
    }

    #[test]
    fn filters_narrow_before_query() {
        let mut a = process("A");
        a.status = ProcessStatus::Published;
        a.department = Some("Finance".into());
        a.tags = vec!["core".into()];
        let b = process("B");

        let filters = SearchFilters {
            status: Some(ProcessStatus::Published),
            department: Some("fin".into()),
            tag: Some("core".into()),
            ..Default::default()
        };
        let hits = search_processes(&[a.clone(), b.clone()], "", &filters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].process_id, a.id);

        let everything = search_processes(&[a, b], "  ", &SearchFilters::default());
        assert_eq!(everything.len(), 2);
    }
}
