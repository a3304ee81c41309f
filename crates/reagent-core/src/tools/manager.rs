//! Tool-calling manager: executes proposed tool calls against resolved callbacks

use crate::llm::messages::ChatMessage;
use crate::tools::base::{ToolCallback, ToolError};
use crate::tools::types::{ToolCall, ToolResult, ToolSchema};
use std::sync::Arc;
use tracing::debug;

/// Executes tool calls proposed by the model
///
/// Holds the ordered list of callbacks an agent resolved from its
/// allow-list. Order is preserved from resolution so schemas are
/// advertised in allow-list order.
pub struct ToolCallingManager {
    callbacks: Vec<Arc<dyn ToolCallback>>,
}

impl ToolCallingManager {
    /// Create a manager over an ordered callback list
    pub fn new(callbacks: Vec<Arc<dyn ToolCallback>>) -> Self {
        Self { callbacks }
    }

    /// Get the schemas of all managed callbacks, in advertisement order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.callbacks.iter().map(|cb| cb.schema()).collect()
    }

    /// The managed callbacks, in advertisement order
    pub fn callbacks(&self) -> &[Arc<dyn ToolCallback>] {
        &self.callbacks
    }

    /// Look up a callback by tool name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolCallback>> {
        self.callbacks.iter().find(|cb| cb.name() == name)
    }

    /// Check whether any callbacks are managed
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Execute a single proposed tool call
    ///
    /// Validates the arguments first, then invokes the callback. A tool
    /// that reports failure still produces `Ok` with an error-carrying
    /// [`ToolResult`]; `Err` is reserved for an unknown tool name or a
    /// validation rejection.
    pub async fn execute_tool_call(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let callback = self
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        callback.validate(call)?;

        debug!(tool = %call.name, call_id = %call.id, "executing tool call");
        match callback.call(call).await {
            Ok(result) => Ok(result),
            Err(err) => Ok(ToolResult::error(&call.id, &call.name, err.to_string())),
        }
    }

    /// Build the conversation message carrying a tool result
    ///
    /// Failed results are tagged with an `Error:` prefix so the model
    /// sees the failure on its next turn and can self-correct.
    pub fn tool_response_message(result: &ToolResult) -> ChatMessage {
        let text = if result.success {
            result.output.clone().unwrap_or_default()
        } else {
            format!(
                "Error: {}",
                result.error.as_deref().unwrap_or("unknown tool failure")
            )
        };
        ChatMessage::tool(
            text,
            result.call_id.clone(),
            Some(result.tool_name.clone()),
        )
    }
}
