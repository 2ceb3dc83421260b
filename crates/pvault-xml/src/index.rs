use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{local_name, parse_document, XmlNode};
use crate::error::XmlResult;

/// An identified element of a process document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentElement {
    pub id: String,
    /// Qualified tag name, e.g. `bpmn:userTask`.
    pub tag: String,
    /// All attributes in document order, including `id`.
    pub attributes: Vec<(String, String)>,
    /// Text of the element's `documentation` child, if any.
    pub documentation: Option<String>,
    /// Identifiers of direct child elements that carry an id.
    pub children: Vec<String>,
}

impl DocumentElement {
    fn from_node(id: &str, node: &XmlNode) -> Self {
        let documentation = node
            .children
            .iter()
            .find(|child| child.local_name() == "documentation")
            .map(|child| child.text.clone())
            .filter(|text| !text.is_empty());

        Self {
            id: id.to_string(),
            tag: node.name.clone(),
            attributes: node.attributes.clone(),
            documentation,
            children: node
                .children
                .iter()
                .filter_map(|child| child.id().map(str::to_string))
                .collect(),
        }
    }

    /// Value of an attribute by its qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Display label (`name` attribute).
    pub fn name(&self) -> Option<&str> {
        self.attribute("name")
    }

    /// Tag name without namespace prefix, e.g. `userTask`.
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }
}

/// Mapping from element identifier to element.
///
/// Only elements with a non-empty `id` attribute are indexed; everything
/// else is invisible to the differ. If a document repeats an identifier the
/// later element (in document order) wins. The modeling tool guarantees
/// uniqueness, so this only matters for hand-edited input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementIndex {
    elements: BTreeMap<String, DocumentElement>,
}

impl ElementIndex {
    /// An index with no elements.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index, degrading to empty on malformed input.
    pub fn from_xml(xml: &str) -> Self {
        if xml.trim().is_empty() {
            return Self::empty();
        }
        match Self::try_from_xml(xml) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(error = %e, "malformed process document, indexing as empty");
                Self::empty()
            }
        }
    }

    /// Build the index from an optional snapshot; `None` is an empty document.
    pub fn from_snapshot(xml: Option<&str>) -> Self {
        xml.map(Self::from_xml).unwrap_or_default()
    }

    /// Build the index, reporting malformed input.
    pub fn try_from_xml(xml: &str) -> XmlResult<Self> {
        let root = parse_document(xml)?;
        Ok(Self::from_document(&root))
    }

    /// Index every element of a parsed document that carries an `id`.
    pub fn from_document(root: &XmlNode) -> Self {
        let mut elements = BTreeMap::new();
        for node in root.descendants() {
            if let Some(id) = node.id() {
                elements.insert(id.to_string(), DocumentElement::from_node(id, node));
            }
        }
        Self { elements }
    }

    /// The element with this identifier.
    pub fn get(&self, id: &str) -> Option<&DocumentElement> {
        self.elements.get(id)
    }

    /// Returns `true` if an element has this identifier.
    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no element was indexed.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Elements in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentElement> {
        self.elements.values()
    }
}
