//! Chat message types exchanged with the model provider

use crate::tools::ToolCall;
use crate::types::TokenUsage;
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,
    /// User message (human input or next-step prompt)
    User,
    /// Assistant message (model response)
    Assistant,
    /// Tool message (tool execution result)
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// Tool calls proposed by the model (assistant messages only)
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Tool call this message responds to (tool messages only)
    pub tool_call_id: Option<String>,
    /// Tool name (tool messages only)
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a new assistant message carrying tool call proposals
    pub fn assistant_with_tools<S: Into<String>>(content: S, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a new tool response message
    pub fn tool<S: Into<String>>(content: S, tool_call_id: S, name: Option<S>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: name.map(|n| n.into()),
        }
    }

    /// Check if this message has tool calls
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty())
    }
}

/// Response from the chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Free-text content of the response
    pub content: String,
    /// Tool calls proposed by the model
    pub tool_calls: Vec<ToolCall>,
    /// Model that produced the response
    pub model: Option<String>,
    /// Finish reason reported by the provider
    pub finish_reason: Option<String>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Create a new response with only free text
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            model: None,
            finish_reason: None,
            usage: None,
        }
    }

    /// Create a response with tool call proposals
    pub fn with_tool_calls<S: Into<String>>(content: S, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
            model: None,
            finish_reason: None,
            usage: None,
        }
    }

    /// Add usage information
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Check if the response proposes any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Get the first proposed tool call, if any
    ///
    /// The loop acts on at most one call per cycle; proposals after the
    /// first stay visible on the assistant message but are never executed.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::system("be helpful");
        assert_eq!(msg.role, MessageRole::System);
        assert!(!msg.has_tool_calls());

        let msg = ChatMessage::tool("ok", "call-1", Some("search"));
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call-1"));
        assert_eq!(msg.name.as_deref(), Some("search"));
    }

    #[test]
    fn test_first_tool_call() {
        let calls = vec![
            ToolCall::new("id-1", "alpha", HashMap::new()),
            ToolCall::new("id-2", "beta", HashMap::new()),
        ];
        let response = ChatResponse::with_tool_calls("", calls);
        assert!(response.has_tool_calls());
        assert_eq!(response.first_tool_call().unwrap().name, "alpha");
    }

    #[test]
    fn test_empty_tool_calls_normalized() {
        let msg = ChatMessage::assistant_with_tools("hi", Vec::new());
        assert!(msg.tool_calls.is_none());
    }
}
