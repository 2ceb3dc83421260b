//! Text-to-tree parsing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};

/// A parsed XML element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified tag name as written, e.g. `bpmn:task`.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated direct character data (trimmed).
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Value of an attribute by its qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The element identifier. Empty `id` attributes count as absent.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }

    /// This node and all its descendants, depth-first in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a node and its descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Parse a complete document into its root element.
///
/// The whole input must be well-formed: exactly one root element, every
/// element closed, and no character data outside the root.
pub fn parse_document(xml: &str) -> XmlResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut open: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlError::Syntax {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

        match event {
            Event::Start(start) => {
                let node = start_node(&start)?;
                if open.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots(node.name));
                }
                open.push(node);
            }
            Event::Empty(start) => {
                let node = start_node(&start)?;
                attach(&mut open, &mut root, node)?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let node = open.pop().ok_or(XmlError::UnexpectedEnd(name.clone()))?;
                if node.name != name {
                    return Err(XmlError::Syntax {
                        position: reader.buffer_position(),
                        message: format!("expected </{}>, found </{name}>", node.name),
                    });
                }
                attach(&mut open, &mut root, node)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| XmlError::Syntax {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })?;
                push_text(&mut open, &value)?;
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_text(&mut open, value.trim())?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(XmlError::UnclosedElement(unclosed.name.clone()));
    }
    root.ok_or(XmlError::NoRootElement)
}

fn start_node(start: &BytesStart<'_>) -> XmlResult<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::InvalidAttribute {
            element: name.clone(),
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::InvalidAttribute {
                element: name.clone(),
                message: e.to_string(),
            })?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlNode {
        name,
        attributes,
        ..Default::default()
    })
}

fn attach(open: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> XmlResult<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => return Err(XmlError::MultipleRoots(node.name)),
        None => *root = Some(node),
    }
    Ok(())
}

fn push_text(open: &mut [XmlNode], value: &str) -> XmlResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    match open.last_mut() {
        Some(node) => {
            if !node.text.is_empty() {
                node.text.push(' ');
            }
            node.text.push_str(value);
            Ok(())
        }
        None => Err(XmlError::TextOutsideRoot),
    }
}
