//! XML element index for BPMN documents.
//!
//! Parses a serialized process diagram into a tree of [`XmlNode`]s and
//! flattens it into an [`ElementIndex`] keyed by element identifier, which
//! is what the semantic differ consumes.
//!
//! # Degradation
//!
//! [`parse_document`] reports malformed input as an [`XmlError`]. Everything
//! built on top of it ([`ElementIndex::from_xml`], [`ProcessMetrics::from_xml`],
//! [`find_named_element`]) treats a parse failure as "no elements" and never
//! fails the caller.

pub mod document;
pub mod error;
pub mod index;
pub mod metrics;
pub mod search;

pub use document::{parse_document, XmlNode};
pub use error::{XmlError, XmlResult};
pub use index::{DocumentElement, ElementIndex};
pub use metrics::ProcessMetrics;
pub use search::{find_named_element, ContentMatch};
