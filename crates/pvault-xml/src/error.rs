//! Error types for XML parsing.

/// Reasons a document could not be parsed into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The tokenizer rejected the input (mismatched tags, bad escapes, ...).
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    /// An attribute could not be decoded.
    #[error("invalid attribute on <{element}>: {message}")]
    InvalidAttribute { element: String, message: String },

    /// The input ended while elements were still open.
    #[error("unclosed element <{0}>")]
    UnclosedElement(String),

    /// A closing tag appeared with no matching open element.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    /// A second top-level element followed the root.
    #[error("multiple root elements (second: <{0}>)")]
    MultipleRoots(String),

    /// Character data appeared outside the root element.
    #[error("text outside the root element")]
    TextOutsideRoot,

    /// The input contained no element at all.
    #[error("document has no root element")]
    NoRootElement,
}

/// Convenience alias for XML results.
pub type XmlResult<T> = Result<T, XmlError>;
