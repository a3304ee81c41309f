//! Reagent Core Library
//!
//! Core functionality for the Reagent agent system: the ReAct loop,
//! tool-callback management, execution recording, conversation memory,
//! and the chat model boundary.

pub mod advisor;
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod prompts;
pub mod recorder;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use agent::{
    LoopOutcome, LoopStatus, ReactAgent, ReactLoop, StepContext, ThinkOutcome, ToolCallAgent,
    ToolCallAgentBuilder,
};
pub use config::{AgentProperties, Config, ModelConfig};
pub use error::{AgentError, AgentResult};
pub use llm::{ChatMessage, ChatModel, ChatResponse, MessageRole, OpenAiCompatClient};
pub use memory::{ChatMemory, InMemoryChatMemory};
pub use recorder::{AgentExecutionRecord, PlanExecutionRecorder, RecordStatus, ThinkActRecord};
pub use tools::{ToolCall, ToolCallback, ToolCallingManager, ToolRegistry, ToolResult, ToolSchema};
pub use types::*;
