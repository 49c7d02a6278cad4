use crate::tools::error::ToolError;
use crate::llm::error::LLMError;

/// A failed attempt inside a step: the LLM call itself or one of the tools it asked for.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Llm(#[from] LLMError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Maximum iterations exceeded: {0}")]
    MaxIterationsExceeded(usize),

    #[error("Maximum retries per step exceeded: {limit}")]
    MaxRetriesPerStepExceeded {
        limit: usize,
        #[source]
        last: StepError,
    },

    #[error("Maximum total retries exceeded: {limit}")]
    TotalMaxRetriesExceeded {
        limit: usize,
        #[source]
        last: StepError,
    },
}

impl AgentError {
    /// Stable identifier used in diagnostic dumps.
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::MaxIterationsExceeded(_) => "max_iterations_exceeded",
            AgentError::MaxRetriesPerStepExceeded { .. } => "max_retries_per_step_exceeded",
            AgentError::TotalMaxRetriesExceeded { .. } => "total_max_retries_exceeded",
        }
    }
}
