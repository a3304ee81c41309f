//! Error types for the Reagent framework

use thiserror::Error;

/// Result type alias for Reagent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Main error type for the Reagent framework
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat model / provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool execution errors
    #[error("Tool error: {tool_name}: {message}")]
    Tool { tool_name: String, message: String },

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Recorder errors (missing plan or execution key, closed record)
    #[error("Recorder error: {0}")]
    Recorder(String),

    /// Conversation memory errors
    #[error("Memory error: {0}")]
    Memory(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl AgentError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a new tool error
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a new agent error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent(message.into())
    }

    /// Create a new recorder error
    pub fn recorder(message: impl Into<String>) -> Self {
        Self::Recorder(message.into())
    }

    /// Create a new memory error
    pub fn memory(message: impl Into<String>) -> Self {
        Self::Memory(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<std::io::Error> for AgentError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<toml::de::Error> for AgentError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}
