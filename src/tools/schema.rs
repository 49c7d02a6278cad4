use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSchema {
    pub name: String,
    pub arg_type: String,
    pub description: String,
    pub required: bool,
}

impl ArgSchema {
    pub fn required(name: &str, arg_type: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            arg_type: arg_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: &str, arg_type: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, arg_type, description)
        }
    }
}

/// What the LLM sees when choosing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub args: Vec<ArgSchema>,
}
