use crate::llm::error::LLMError;
use crate::tools::error::ToolError;
use crate::agent::error::AgentError;
use crate::clients::ClientError;
use crate::config::ConfigError;
use crate::tools::registry::DuplicateToolError;
use crate::gallery::GalleryError;


#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),
    
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
    
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
    
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Registry error: {0}")]
    Registry(#[from] DuplicateToolError),

    #[error("Gallery error: {0}")]
    Gallery(#[from] GalleryError),
}

pub type Result<T> = std::result::Result<T, Error>;
