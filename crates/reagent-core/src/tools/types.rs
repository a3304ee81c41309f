//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tool call proposed by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(
        id: S,
        name: S,
        arguments: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get a typed argument value
    pub fn get_argument<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.arguments
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_argument::<String>(key)
    }

    /// Get a boolean argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_argument::<bool>(key)
    }

    /// Arguments as a JSON object, for recording
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.arguments).unwrap_or_default()
    }
}

/// Result of a tool execution
///
/// Tools should construct results through [`ToolResult::success`] and
/// [`ToolResult::error`] rather than building the struct by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool call ID this result corresponds to
    pub call_id: String,
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the tool execution was successful
    pub success: bool,
    /// Output from the tool (if successful)
    pub output: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    /// Create a failed tool result
    pub fn error(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Parameter definition for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Parameter type (string, number, boolean, object, array)
    pub param_type: String,
    /// Whether this parameter is required
    pub required: bool,
}

impl ToolParameter {
    /// Create a required string parameter
    pub fn string<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "string".to_string(),
            required: true,
        }
    }

    /// Create an optional string parameter
    pub fn optional_string<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "string".to_string(),
            required: false,
        }
    }

    /// Create a required object parameter
    pub fn object<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "object".to_string(),
            required: true,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// JSON schema for a tool, advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input parameters schema (JSON Schema object)
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a new tool schema from a parameter list
    pub fn new<S: Into<String>>(name: S, description: S, parameters: Vec<ToolParameter>) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in parameters {
            if param.required {
                required.push(param.name.clone());
            }

            let mut param_schema = serde_json::Map::new();
            param_schema.insert("type".to_string(), param.param_type.into());
            param_schema.insert("description".to_string(), param.description.into());
            properties.insert(param.name, param_schema.into());
        }

        let parameters_schema = serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters_schema,
        }
    }
}
