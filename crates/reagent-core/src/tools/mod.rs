//! Tool callbacks, registry and execution

pub mod base;
pub mod manager;
pub mod registry;
pub mod types;

pub use base::{ToolCallback, ToolError};
pub use manager::ToolCallingManager;
pub use registry::ToolRegistry;
pub use types::{ToolCall, ToolParameter, ToolResult, ToolSchema};
