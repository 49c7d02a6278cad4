use std::sync::{Arc, Mutex};
use crate::clients::http_client;
use crate::config::Config;
use crate::llm::{ollama::Ollama, traits::LLM, CallInfo};
use crate::message::Message;
use crate::tools::{
    error::{ToolError, ToolResult},
    registry::{DuplicateToolError, ToolRegistry},
    traits::Tool,
};
use serde_json::json;
use tracing::{debug, info, warn};


pub mod types;
pub mod error;
pub mod traits;
pub mod memory;
pub mod diagnostics;

use traits::AgentRunner;
use types::{Agent, AgentResult, AgentExecuteResult, AgentUpdate, RunOptions, UpdateSender};
use error::{AgentError, StepError};
use memory::ConversationMemory;


impl Agent {
    /// Create a new Agent with the provided name, LLM and tools.
    pub fn new(name: impl Into<String>, llm: Arc<dyn LLM>, tools: ToolRegistry, memory_limit: usize) -> Self {
        Self {
            name: name.into(),
            llm,
            tools,
            system_prompt: None,
            memory: Mutex::new(ConversationMemory::new(memory_limit)),
        }
    }

    /// Wire the full tool set and the Ollama model described by `config`.
    pub fn from_config(name: impl Into<String>, config: &Config) -> crate::error::Result<Self> {
        let tools = ToolRegistry::from_config(config, http_client()?)?;
        let llm = Ollama::from_config(&config.ollama);
        info!(model = llm.model(), tools = tools.len(), "agent configured");

        let mut agent = Self::new(name, Arc::new(llm), tools, config.agent.memory_limit);
        agent.system_prompt = config.agent.system_prompt.clone();
        Ok(agent)
    }

    /// Register one more tool. Returns &mut Self for chaining.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> Result<&mut Self, DuplicateToolError> {
        self.tools.register(tool)?;
        Ok(self)
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Set or replace the agent's system prompt.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    /// Snapshot of the remembered conversation.
    pub fn history(&self) -> Vec<Message> {
        self.memory.lock().unwrap_or_else(|e| e.into_inner()).messages()
    }

    fn remember(&self, prompt: &str, answer: &str) {
        self.memory
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_exchange(Message::user(prompt), Message::assistant(answer));
    }

    // system prompt plus the tool-call protocol
    pub fn generate_system_prompt(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(prompt) = self.system_prompt.as_ref() {
            msgs.push(Message::system(prompt.clone()));
        }
        if !self.tools.is_empty() {
            msgs.push(Message::system(format!(
                "You can call the tools described below. To call tools, answer with JSON in exactly this format: {}

            Tool results come back as tool messages. A failed call is reported with its error kind: \
            InputValidationError means fix the arguments, UpstreamError means the service failed and you may retry or try another tool.
            IMPORTANT: When you have everything you need, reply with the final answer as plain text WITHOUT any tool_calls.",
                json!({
                    "tool_calls": [
                        {
                            "name": "tool_name",
                            "args": {
                                "param1": "value1",
                                "param2": "value2"
                            }
                        }
                    ]
                })
            )));
        }
        msgs
    }

    // one system message per tool descriptor
    pub fn generate_tools_prompt(&self) -> Vec<Message> {
        self.tools
            .descriptors()
            .iter()
            .filter_map(|descriptor| serde_json::to_string(descriptor).ok())
            .map(Message::system)
            .collect()
    }

    async fn invoke_tool(&self, call: &CallInfo) -> ToolResult {
        match self.tools.get(&call.name) {
            Some(tool) => tool.run(call.args.clone()).await,
            None => Err(ToolError::invalid(format!(
                "Tool '{}' does not exist. Available tools: {}",
                call.name,
                self.tools.names().join(", ")
            ))),
        }
    }
}

/// Per-run failure bookkeeping.
struct RetryBudget<'a> {
    options: &'a RunOptions,
    step: usize,
    total: usize,
}

impl<'a> RetryBudget<'a> {
    fn new(options: &'a RunOptions) -> Self {
        Self { options, step: 0, total: 0 }
    }

    /// Count one failed attempt; error out once a limit is passed.
    fn spend(&mut self, failure: StepError) -> Result<(), AgentError> {
        self.step += 1;
        self.total += 1;
        if self.total > self.options.total_max_retries {
            return Err(AgentError::TotalMaxRetriesExceeded {
                limit: self.options.total_max_retries,
                last: failure,
            });
        }
        if self.step > self.options.max_retries_per_step {
            return Err(AgentError::MaxRetriesPerStepExceeded {
                limit: self.options.max_retries_per_step,
                last: failure,
            });
        }
        warn!(step_retries = self.step, total_retries = self.total, error = %failure, "retrying step");
        Ok(())
    }

    fn step_succeeded(&mut self) {
        self.step = 0;
    }
}

fn emit(updates: &UpdateSender, key: &str, value: impl Into<String>) {
    // the receiver may have gone away; the run continues regardless
    let _ = updates.send(AgentUpdate::new(key, value));
}


#[async_trait::async_trait]
impl AgentRunner for Agent {
    async fn run(&self, prompt: &str, options: &RunOptions, updates: UpdateSender) -> AgentExecuteResult {
        let mut msgs: Vec<Message> = self.generate_system_prompt();
        msgs.extend(self.generate_tools_prompt());
        msgs.extend(self.history());
        msgs.push(Message::user(prompt.to_string()));

        let mut result = AgentResult::default();
        let mut budget = RetryBudget::new(options);
        info!(agent = %self.name, "starting run");

        // Main loop: call LLM, execute requested tools, feed results back, repeat.
        while result.iterations < options.max_iterations {
            let res = match self.llm.generate(&msgs).await {
                Ok(res) => res,
                Err(err) => {
                    budget.spend(StepError::Llm(err))?;
                    continue;
                }
            };
            result.iterations += 1;
            result.tokens.add(&res.tokens);

            if res.tool_calls.is_empty() {
                emit(&updates, "final_answer", res.generation.as_str());
                self.remember(prompt, &res.generation);
                result.generation = res.generation;
                info!(agent = %self.name, iterations = result.iterations, tokens = result.tokens.total_tokens, "run finished");
                return Ok(result);
            }

            emit(&updates, "thought", res.generation.as_str());
            msgs.push(Message::assistant(res.generation));

            let mut failure = None;
            for call in res.tool_calls {
                let name = call.name.as_str();
                emit(&updates, "tool_name", name);
                emit(&updates, "tool_input", call.args.to_string());
                debug!(tool = name, args = %call.args, "invoking tool");

                match self.invoke_tool(&call).await {
                    Ok(output) => {
                        emit(&updates, "tool_output", output.as_str());
                        msgs.push(Message::tool_res(name, format!("Tool {} returned: {}", name, output)));
                    }
                    Err(err) => {
                        emit(&updates, "tool_error", format!("{}: {}", err.kind(), err));
                        msgs.push(Message::tool_res(
                            name,
                            format!("Tool {} failed with {}: {}", name, err.kind(), err),
                        ));
                        failure = Some(err);
                    }
                }
            }

            match failure {
                Some(err) => budget.spend(StepError::Tool(err))?,
                None => budget.step_succeeded(),
            }
        }
        Err(AgentError::MaxIterationsExceeded(options.max_iterations))
    }
}
