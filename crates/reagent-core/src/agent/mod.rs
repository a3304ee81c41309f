//! ReAct agents and the loop driver

pub mod driver;
pub mod toolcall;
pub mod traits;

#[cfg(test)]
mod toolcall_tests;

pub use driver::{LoopOutcome, LoopStatus, ReactLoop};
pub use toolcall::{ToolCallAgent, ToolCallAgentBuilder};
pub use traits::{ReactAgent, StepContext, ThinkOutcome};
