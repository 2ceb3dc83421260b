use crate::agent::AgentProvider;

/// Errors produced by assistant support.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("invalid agent configuration: {0}")]
    InvalidAgent(String),

    #[error("provider {0} does not support this request")]
    Unsupported(AgentProvider),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("generated diagram is not well-formed XML: {0}")]
    InvalidDiagram(#[from] pvault_xml::XmlError),
}

impl From<serde_json::Error> for AssistError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience alias for assistant results.
pub type AssistResult<T> = Result<T, AssistError>;
