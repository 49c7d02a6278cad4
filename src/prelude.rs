//! Common imports for wiring an agent together.

pub use crate::agent::{
    traits::AgentRunner,
    types::{Agent, AgentResult, AgentUpdate, RunOptions},
    error::AgentError,
};
pub use crate::clients::{
    duckduckgo::DuckDuckGoClient,
    flickr::FlickrClient,
    open_meteo::OpenMeteoClient,
    watsonx::WatsonxClient,
};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{Error, Result};
pub use crate::llm::{traits::LLM, ollama::Ollama, GenerateResult, CallInfo};
pub use crate::message::Message;
pub use crate::session::Session;
pub use crate::tools::{
    error::{ToolError, ToolErrorKind, ToolResult},
    registry::ToolRegistry,
    traits::{Tool, TypedTool},
};
