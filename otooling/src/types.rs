//! Tool call and tool definition types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{ToolError, parse_arguments};

/// One invocation request as received from the protocol layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Builds a call from argument text, as most protocol frames carry it.
    pub fn from_json(
        id: impl Into<String>,
        name: impl Into<String>,
        args_json: &str,
    ) -> Result<Self, ToolError> {
        Ok(Self::new(id, name, parse_arguments(args_json)?))
    }
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// What a caller sees when listing tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, input_schema: Value) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            description: String::new(),
            input_schema,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Schema advertised for operations that take no input at all.
pub fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}
