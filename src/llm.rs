pub mod traits;
pub mod ollama;
pub mod tokens;
pub mod error;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;

/// Result of a text generation from an LLM.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    pub tokens: TokenUsage,
    pub generation: String,
    /// Tools the LLM asked the agent to invoke during this generation.
    #[serde(default)]
    pub tool_calls: Vec<CallInfo>,
}

/// Structured information about a single tool call requested by the LLM.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallInfo {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;

/// Extract `{"tool_calls": [{"name": .., "args": {..}}]}` from raw model text.
///
/// Models often wrap the JSON in prose or code fences, so when the whole text
/// is not JSON the outermost `{ .. }` substring is tried instead. Entries
/// without a string `name` are skipped; a missing `args` becomes `{}`.
pub fn parse_tool_calls(generation: &str) -> Vec<CallInfo> {
    let parsed = serde_json::from_str::<JsonValue>(generation).ok().or_else(|| {
        let start = generation.find('{')?;
        let end = generation.rfind('}')?;
        if start >= end {
            return None;
        }
        serde_json::from_str::<JsonValue>(&generation[start..=end]).ok()
    });

    let Some(entries) = parsed
        .as_ref()
        .and_then(|v| v.get("tool_calls"))
        .and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.to_string();
            let args = entry
                .get("args")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}));
            Some(CallInfo { name, args })
        })
        .collect()
}
