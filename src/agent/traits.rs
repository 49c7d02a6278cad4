use super::types::{AgentExecuteResult, RunOptions, UpdateSender};

/// Trait describing runtime operations an agent can perform.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    /// Answer `prompt`, calling tools as needed within `options`.
    /// Progress is reported on `updates`; the sender is dropped when the run ends.
    async fn run(&self, prompt: &str, options: &RunOptions, updates: UpdateSender) -> AgentExecuteResult;
}
