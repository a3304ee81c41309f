//! Base trait and error type for tool callbacks

use crate::error::AgentError;
use crate::tools::types::{ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

/// Error type for tool operations
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid arguments provided to the tool
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => AgentError::tool(name, "Tool not found"),
            other => AgentError::tool("unknown", other.to_string()),
        }
    }
}

/// A named, invocable capability exposed to the model as a structured action
///
/// Each callback declares an input schema so the model can produce valid
/// arguments. The registry maps tool keys to callbacks; agents resolve
/// their allow-list against it at construction time.
#[async_trait]
pub trait ToolCallback: Send + Sync {
    /// Get the tool's unique name
    ///
    /// Names must be unique within a registry and should be lowercase
    /// with underscores (e.g. "web_crawler").
    fn name(&self) -> &str;

    /// Get the tool's description, advertised to the model
    fn description(&self) -> &str;

    /// Get the tool's JSON schema for input parameters
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments
    async fn call(&self, call: &ToolCall) -> Result<ToolResult, ToolError>;

    /// Validate the tool call arguments before execution
    ///
    /// Default implementation does nothing. Override for custom validation.
    fn validate(&self, call: &ToolCall) -> Result<(), ToolError> {
        let _ = call;
        Ok(())
    }
}
