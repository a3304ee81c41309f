//! ReAct agent trait and per-cycle context

use crate::llm::messages::ChatMessage;
use crate::tools::{ToolCall, ToolCallback};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of one thinking phase
///
/// An explicit sum type rather than a boolean-and-status-flag pair:
/// provider failures are captured on the cycle's record and surfaced
/// here, so callers decide what "no progress" means without catching
/// anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThinkOutcome {
    /// The model proposed at least one tool call; act() should run
    Action,
    /// The model produced a final answer with no tool call
    Complete,
    /// Thinking failed; the reason is also on the ThinkActRecord
    Failed(String),
}

impl ThinkOutcome {
    /// Whether act() should be invoked for this cycle
    pub fn needs_action(&self) -> bool {
        matches!(self, ThinkOutcome::Action)
    }
}

/// Per-cycle state threaded from think() to act() by the loop driver
///
/// Replaces mutable response/prompt fields on the agent: each cycle gets
/// a fresh context, so nothing aliases across cycles.
#[derive(Debug, Default)]
pub struct StepContext {
    /// 1-based cycle number within the current loop
    pub step_number: u32,
    /// The tool call selected during think(), consumed by act()
    pub pending_call: Option<ToolCall>,
}

impl StepContext {
    /// Create the context for a new cycle
    pub fn new(step_number: u32) -> Self {
        Self {
            step_number,
            pending_call: None,
        }
    }
}

/// A ReAct agent: alternating reasoning and acting under a loop driver
///
/// Concrete variants are selected by configuration and wiring, not by
/// subclassing; everything the driver needs is on this interface.
#[async_trait]
pub trait ReactAgent: Send {
    /// Agent name
    fn name(&self) -> &str;

    /// Agent description
    fn description(&self) -> &str;

    /// The callbacks this agent may invoke, in advertisement order
    fn tool_call_list(&self) -> Vec<Arc<dyn ToolCallback>>;

    /// The rendered next-step prompt message
    fn next_step_message(&self) -> ChatMessage;

    /// Run one thinking phase: consult the model and select a tool call
    ///
    /// Never returns an error; failures are recorded and mapped to
    /// [`ThinkOutcome::Failed`] so a single bad cycle cannot unwind the
    /// loop.
    async fn think(&mut self, cx: &mut StepContext) -> ThinkOutcome;

    /// Execute the pending tool call and feed its result back to memory
    ///
    /// Returns the result text; on failure the text begins with
    /// `"Error:"` and the same text was appended to memory so the model
    /// sees it next turn.
    async fn act(&mut self, cx: &mut StepContext) -> String;
}
