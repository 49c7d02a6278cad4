use serde::de::DeserializeOwned;

use super::error::{ToolError, ToolResult};

// re-export for tool implementations
pub use super::schema::{ArgSchema, ToolDescriptor};

/// Object-safe tool interface consumed by the agent runtime.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> Vec<ArgSchema>;
    async fn run(&self, input: serde_json::Value) -> ToolResult;

    fn describe(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args: self.args(),
        }
    }
}

/// Text shape of a successful tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    /// Rendered one entry per line.
    Lines(Vec<String>),
}

impl ToolOutput {
    pub fn render(self) -> String {
        match self {
            ToolOutput::Text(text) => text,
            ToolOutput::Lines(lines) => lines.join("\n"),
        }
    }
}

/// Typed adapter around one external capability.
///
/// Implementors get [`Tool`] for free: the raw JSON input is deserialized into
/// `Input` and passed through [`TypedTool::validate`] before [`TypedTool::call`]
/// runs, so a malformed call never reaches the network.
#[async_trait::async_trait]
pub trait TypedTool: Send + Sync {
    type Input: DeserializeOwned + Send + 'static;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn input_schema(&self) -> Vec<ArgSchema>;

    /// Semantic checks the deserializer cannot express.
    fn validate(&self, _input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    async fn call(&self, input: Self::Input) -> Result<ToolOutput, ToolError>;
}

#[async_trait::async_trait]
impl<T: TypedTool> Tool for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn description(&self) -> &str {
        T::DESCRIPTION
    }

    fn args(&self) -> Vec<ArgSchema> {
        self.input_schema()
    }

    async fn run(&self, input: serde_json::Value) -> ToolResult {
        let input: T::Input = serde_json::from_value(input)
            .map_err(|e| ToolError::InputValidation(format!("{}: {}", T::NAME, e)))?;
        self.validate(&input)
            .map_err(|reason| ToolError::InputValidation(format!("{}: {}", T::NAME, reason)))?;

        let output = self.call(input).await.inspect_err(|err| {
            tracing::debug!(tool = T::NAME, kind = %err.kind(), error = %err, "tool call failed");
        })?;
        Ok(output.render())
    }
}
