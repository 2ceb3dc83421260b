use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssistError;

/// The family of API an agent talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProvider {
    OpenAi,
    Anthropic,
    Custom,
}

impl AgentProvider {
    /// Wire name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Custom => "custom",
        }
    }

    /// Model used when an agent leaves `model` empty.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("gpt-4o"),
            Self::Anthropic => Some("claude-3-5-sonnet-20240620"),
            Self::Custom => None,
        }
    }

    /// Whether the provider takes the system prompt outside the message list.
    pub fn separates_system_prompt(&self) -> bool {
        matches!(self, Self::Anthropic)
    }
}

impl fmt::Display for AgentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentProvider {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "custom" => Ok(Self::Custom),
            other => Err(AssistError::InvalidAgent(format!("unknown provider: {other}"))),
        }
    }
}

/// A named, user-configured assistant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub provider: AgentProvider,
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

impl AgentConfig {
    /// A new agent with a fresh UUID v7 id.
    pub fn new(
        name: impl Into<String>,
        provider: AgentProvider,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.into(),
            provider,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// The configured model, or the provider default.
    pub fn effective_model(&self) -> Option<&str> {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            Some(&self.model)
        }
    }

    /// Check that the name and API key are present.
    pub fn validate(&self) -> Result<(), AssistError> {
        if self.id.trim().is_empty() {
            return Err(AssistError::InvalidAgent("empty id".into()));
        }
        if self.name.trim().is_empty() {
            return Err(AssistError::InvalidAgent("empty name".into()));
        }
        if self.effective_model().is_none() {
            return Err(AssistError::InvalidAgent(format!(
                "agent {} needs an explicit model for provider {}",
                self.name, self.provider
            )));
        }
        Ok(())
    }

    /// The key with all but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{tail}", "*".repeat(chars.len() - 4))
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("api_key", &self.masked_key())
            .field("model", &self.model)
            .finish()
    }
}
