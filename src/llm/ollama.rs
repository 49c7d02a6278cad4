
use std::sync::Arc;
use futures::{
    FutureExt,
    future::BoxFuture,
};
use tracing::debug;

use crate::config::OllamaConfig;
use crate::message::Message;
use crate::message::MessageRole as MsgRole;

use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    parse_tool_calls,
    GenerateResult,
    LLMResult,
};

/// Default model name used when no model is specified.
/// Must match a model pulled into the local Ollama (`ollama list`).
pub const DEFAULT_MODEL: &str = "llama3.1";

pub use ollama_rs::{
    error::OllamaError,
    Ollama as OllamaClient,
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
};


#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
}

impl Ollama {
    /// Create an `Ollama` wrapper using the provided client and the default model.
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build the client from host, port and model settings.
    /// `config.host` must already be a URL with a host; `Config` checks this.
    pub fn from_config(config: &OllamaConfig) -> Self {
        let client = OllamaClient::builder()
            .host(config.host.as_str())
            .port(config.port)
            .build();
        Self::new(Arc::new(client)).with_model(config.model.clone())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_request(&self, messages: &[Message]) -> ChatMessageRequest {
        let mapped_messages = messages.iter().map(|message| message.into()).collect();
        ChatMessageRequest::new(self.model.clone(), mapped_messages)
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MsgRole::System => MessageRole::System,
            MsgRole::User => MessageRole::User,
            MsgRole::Assistant => MessageRole::Assistant,
            MsgRole::Tool => MessageRole::Tool,
        };
        ChatMessage::new(role, message.content.clone())
    }
}


impl LLM for Ollama {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let request = self.generate_request(messages);
            debug!(model = %self.model, messages = messages.len(), "sending chat request to ollama");

            let response = self.client.send_chat_messages(request).await?;
            let generation = response.message.content;

            let tokens = response
                .final_data
                .map(|final_data| {
                    TokenUsage::new(final_data.prompt_eval_count as u32, final_data.eval_count as u32)
                })
                .unwrap_or_default();

            let tool_calls = parse_tool_calls(&generation);
            Ok(GenerateResult { tokens, generation, tool_calls })
        }
        .boxed()
    }
}
