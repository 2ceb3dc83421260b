use serde::{Deserialize, Serialize};

use crate::document::parse_document;

/// An element whose display name matched a content search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMatch {
    pub element_id: Option<String>,
    /// Local tag name, e.g. `task`.
    pub kind: String,
    pub name: String,
}

impl ContentMatch {
    /// Human-readable snippet, e.g. `Found in userTask: "Approve invoice"`.
    pub fn snippet(&self) -> String {
        format!("Found in {}: \"{}\"", self.kind, self.name)
    }
}

/// Find the first element (document order) whose `name` contains `query`,
/// ignoring case. Malformed documents and empty queries match nothing.
pub fn find_named_element(xml: &str, query: &str) -> Option<ContentMatch> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || xml.trim().is_empty() {
        return None;
    }

    let root = match parse_document(xml) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(error = %e, "skipping content search of malformed document");
            return None;
        }
    };

    root.descendants().find_map(|node| {
        let name = node.attribute("name")?;
        name.to_lowercase().contains(&needle).then(|| ContentMatch {
            element_id: node.id().map(str::to_string),
            kind: node.local_name().to_string(),
            name: name.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<bpmn:definitions xmlns:bpmn="x">
  <bpmn:process id="P" name="Accounts payable">
    <bpmn:userTask id="T1" name="Approve Invoice"/>
    <bpmn:task id="T2" name="Archive invoice"/>
  </bpmn:process>
</bpmn:definitions>"#;

    #[test]
    fn first_match_in_document_order() {
        let m = find_named_element(XML, "INVOICE").unwrap();
        assert_eq!(m.element_id.as_deref(), Some("T1"));
        assert_eq!(m.kind, "userTask");
        assert_eq!(m.snippet(), "Found in userTask: \"Approve Invoice\"");
    }

    #[test]
    fn container_names_match_too() {
        let m = find_named_element(XML, "payable").unwrap();
        assert_eq!(m.kind, "process");
    }

    #[test]
    fn no_match_or_bad_input() {
        assert!(find_named_element(XML, "shipping").is_none());
        assert!(find_named_element(XML, "  ").is_none());
        assert!(find_named_element("<broken", "invoice").is_none());
    }
}
