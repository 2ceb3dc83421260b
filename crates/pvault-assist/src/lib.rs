//! Assistant support for Process Vault.
//!
//! Holds what is provider-independent about LLM assistants: named agent
//! configurations persisted in a JSON file, the multimodal chat message
//! model, and the [`TextGenerator`] seam that concrete HTTP clients plug
//! into. No network calls are made by this crate.

pub mod agent;
pub mod assistant;
pub mod error;
pub mod message;
pub mod prompt;
pub mod store;

pub use agent::{AgentConfig, AgentProvider};
pub use assistant::{DiagramAssistant, GenerationRequest, TextGenerator};
pub use error::{AssistError, AssistResult};
pub use message::{ChatMessage, ChatRole, ContentPart, ImageUrl, InlineImage, MessageContent};
pub use prompt::{strip_code_fences, BPMN_SYSTEM_PROMPT};
pub use store::AgentConfigStore;
