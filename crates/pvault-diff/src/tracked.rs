use serde::{Deserialize, Serialize};

use pvault_xml::DocumentElement;

/// The attributes whose change marks an element as modified.
///
/// Defaults to the display label (`name`). Extend explicitly, e.g. with
/// owner or SLA extension attributes, rather than diffing whole subtrees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedAttributes(Vec<String>);

impl TrackedAttributes {
    /// Track the given attributes, ignoring repeats.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracked = Self(Vec::new());
        for name in names {
            tracked = tracked.with(name);
        }
        tracked
    }

    /// Add an attribute (ignored if already tracked).
    pub fn with(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.0.contains(&name) {
            self.0.push(name);
        }
        self
    }

    /// Tracked attribute names in tracking order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Tracked attributes whose values differ, in tracking order.
    ///
    /// An absent attribute is distinct from an empty one.
    pub fn changed(&self, old: &DocumentElement, new: &DocumentElement) -> Vec<String> {
        self.0
            .iter()
            .filter(|name| old.attribute(name) != new.attribute(name))
            .cloned()
            .collect()
    }
}

impl Default for TrackedAttributes {
    fn default() -> Self {
        Self(vec!["name".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(attrs: &[(&str, &str)]) -> DocumentElement {
        DocumentElement {
            id: "T1".into(),
            tag: "bpmn:task".into(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            documentation: None,
            children: vec![],
        }
    }

    #[test]
    fn default_tracks_name_only() {
        let tracked = TrackedAttributes::default();
        let old = element(&[("name", "Review"), ("owner", "ana")]);
        let new = element(&[("name", "Review"), ("owner", "bo")]);
        assert!(tracked.changed(&old, &new).is_empty());
    }

    #[test]
    fn extended_set_reports_each_change() {
        let tracked = TrackedAttributes::default().with("owner").with("name");
        assert_eq!(tracked.names(), ["name", "owner"]);

        let old = element(&[("name", "Review"), ("owner", "ana")]);
        let new = element(&[("name", "Check"), ("owner", "bo")]);
        assert_eq!(tracked.changed(&old, &new), vec!["name", "owner"]);
    }

    #[test]
    fn absent_differs_from_empty() {
        let tracked = TrackedAttributes::default();
        let old = element(&[]);
        let new = element(&[("name", "")]);
        assert_eq!(tracked.changed(&old, &new), vec!["name"]);
    }
}
