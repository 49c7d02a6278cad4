use std::fmt;


/// The two ways a tool call can fail. The agent feeds both back to the LLM
/// so it can retry or re-plan; neither is fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// Arguments failed the schema or a semantic check. No network call was made
    /// unless the check depends on upstream data (e.g. an empty search).
    InputValidation,
    /// The external service was unreachable, returned an error or an unusable payload.
    Upstream,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolErrorKind::InputValidation => f.write_str("InputValidationError"),
            ToolErrorKind::Upstream => f.write_str("UpstreamError"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool input is invalid: {0}")]
    InputValidation(String),

    #[error("Upstream error in '{tool}': {message}")]
    Upstream {
        tool: String,
        message: String,
    },
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InputValidation(message.into())
    }

    /// Wrap a provider error, keeping its message for diagnostics.
    pub fn upstream(tool: impl Into<String>, err: impl fmt::Display) -> Self {
        ToolError::Upstream {
            tool: tool.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::InputValidation(_) => ToolErrorKind::InputValidation,
            ToolError::Upstream { .. } => ToolErrorKind::Upstream,
        }
    }
}

/// Outcome of one tool invocation: flat text on success.
pub type ToolResult = Result<String, ToolError>;
