use crate::llm::traits::LLM;
use std::sync::{Arc, Mutex};
use crate::config::AgentConfig;
use crate::tools::registry::ToolRegistry;
use super::error::AgentError;
use super::memory::ConversationMemory;
use crate::llm::tokens::TokenUsage;
use serde::{Serialize, Deserialize};
use tokio::sync::mpsc::UnboundedSender;

/// Tool-calling agent: an LLM, the tools it may call and a short conversation memory.
pub struct Agent {
    /// A short, human-friendly name for the agent instance.
    pub name: String,

    /// The LLM implementation used to pick tools and write answers.
    pub llm: Arc<dyn LLM>,

    /// Tools the agent may call by name.
    pub tools: ToolRegistry,

    /// Optional instructions placed before the tool descriptions.
    pub system_prompt: Option<String>,

    /// Earlier prompts and answers, replayed on the next turn.
    pub(crate) memory: Mutex<ConversationMemory>,
}

/// Execution limits for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Successful LLM calls allowed before giving up.
    pub max_iterations: usize,
    /// Failed attempts (LLM error or failing tool) allowed within one step.
    pub max_retries_per_step: usize,
    /// Failed attempts allowed across the whole run.
    pub total_max_retries: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            max_retries_per_step: 3,
            total_max_retries: 10,
        }
    }
}

impl From<&AgentConfig> for RunOptions {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            max_retries_per_step: config.max_retries_per_step,
            total_max_retries: config.total_max_retries,
        }
    }
}

/// Intermediate progress of a run, keyed by what happened
/// (`thought`, `tool_name`, `tool_input`, `tool_output`, `tool_error`, `final_answer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUpdate {
    pub key: String,
    pub value: String,
}

impl AgentUpdate {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub type UpdateSender = UnboundedSender<AgentUpdate>;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentResult {
    pub tokens: TokenUsage,
    pub generation: String,
    pub iterations: usize,
}

pub type AgentExecuteResult = Result<AgentResult, AgentError>;
