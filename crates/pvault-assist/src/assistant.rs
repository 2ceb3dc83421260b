use async_trait::async_trait;

use crate::agent::AgentConfig;
use crate::error::{AssistError, AssistResult};
use crate::message::ChatMessage;
use crate::prompt::{strip_code_fences, BPMN_SYSTEM_PROMPT};

/// A provider-ready request: agent, resolved model and full conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub agent: AgentConfig,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Opaque request/response text service (an HTTP client in production).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> AssistResult<String>;
}

/// Generates BPMN diagrams from a conversation through a [`TextGenerator`].
pub struct DiagramAssistant<G> {
    agent: AgentConfig,
    generator: G,
    temperature: f32,
}

impl<G: TextGenerator> DiagramAssistant<G> {
    /// Create an assistant for a validated agent.
    pub fn new(agent: AgentConfig, generator: G) -> AssistResult<Self> {
        agent.validate()?;
        Ok(Self {
            agent,
            generator,
            temperature: 0.2,
        })
    }

    /// Set the sampling temperature sent with each request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The agent requests are sent as.
    pub fn agent(&self) -> &AgentConfig {
        &self.agent
    }

    /// Build the request sent for `messages`, system prompt first.
    pub fn request(&self, messages: &[ChatMessage]) -> AssistResult<GenerationRequest> {
        let model = self
            .agent
            .effective_model()
            .ok_or(AssistError::Unsupported(self.agent.provider))?
            .to_string();
        let mut full = Vec::with_capacity(messages.len() + 1);
        full.push(ChatMessage::system(BPMN_SYSTEM_PROMPT));
        full.extend(messages.iter().cloned());
        Ok(GenerationRequest {
            agent: self.agent.clone(),
            model,
            messages: full,
            temperature: self.temperature,
        })
    }

    /// Ask for a diagram and return its XML with code fences removed.
    ///
    /// The response must be well-formed XML; BPMN validity is left to the
    /// editor that imports it.
    pub async fn generate_diagram(&self, messages: &[ChatMessage]) -> AssistResult<String> {
        let request = self.request(messages)?;
        tracing::debug!(agent = %self.agent.name, model = %request.model, "requesting diagram");
        let response = self.generator.generate(&request).await?;
        let xml = strip_code_fences(&response);
        pvault_xml::parse_document(&xml)?;
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::agent::AgentProvider;
    use crate::message::ChatRole;

    /// Returns a canned response and records the last request.
    struct Canned {
        response: String,
        seen: Mutex<Option<GenerationRequest>>,
    }

    impl Canned {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, request: &GenerationRequest) -> AssistResult<String> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(self.response.clone())
        }
    }

    fn agent() -> AgentConfig {
        AgentConfig::new("Modeler", AgentProvider::Anthropic, "sk-1", "")
    }

    #[tokio::test]
    async fn prepends_system_prompt_and_strips_fences() {
        let generator = Canned::new("```xml\n<bpmn:definitions xmlns:bpmn=\"x\"><bpmn:process id=\"P\"/></bpmn:definitions>\n```");
        let assistant = DiagramAssistant::new(agent(), generator).unwrap();

        let xml = assistant
            .generate_diagram(&[ChatMessage::user("Order to cash")])
            .await
            .unwrap();
        assert!(xml.starts_with("<bpmn:definitions"));

        let seen = assistant.generator.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model, "claude-3-5-sonnet-20240620");
        assert_eq!(seen.messages.len(), 2);
        assert_eq!(seen.messages[0].role, ChatRole::System);
        assert_eq!(seen.messages[0].text(), BPMN_SYSTEM_PROMPT);
        assert_eq!(seen.messages[1].text(), "Order to cash");
        assert!((seen.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn prose_responses_are_rejected() {
        let assistant = DiagramAssistant::new(agent(), Canned::new("Sorry, I can't draw that.")).unwrap();
        let err = assistant.generate_diagram(&[ChatMessage::user("?")]).await.unwrap_err();
        assert!(matches!(err, AssistError::InvalidDiagram(_)));
    }

    #[tokio::test]
    async fn generator_errors_propagate() {
        struct Down;

        #[async_trait]
        impl TextGenerator for Down {
            async fn generate(&self, _: &GenerationRequest) -> AssistResult<String> {
                Err(AssistError::Provider("rate limited".into()))
            }
        }

        let assistant = DiagramAssistant::new(agent(), Down).unwrap();
        let err = assistant.generate_diagram(&[]).await.unwrap_err();
        assert!(matches!(err, AssistError::Provider(msg) if msg == "rate limited"));
    }

    #[test]
    fn invalid_agent_is_refused() {
        let custom = AgentConfig::new("Local", AgentProvider::Custom, "k", "");
        assert!(DiagramAssistant::new(custom, Canned::new("")).is_err());
    }
}
