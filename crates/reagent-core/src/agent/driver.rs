//! ReAct loop driver

use crate::agent::traits::{ReactAgent, StepContext, ThinkOutcome};
use tracing::{info, warn};

/// Terminal status of a loop run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStatus {
    /// think() signalled no further action
    Completed,
    /// think() failed; the reason is on the records
    Failed,
    /// The step cap was reached with work still pending
    MaxStepsReached,
}

/// Result of driving an agent to termination
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Why the loop stopped
    pub status: LoopStatus,
    /// Number of think/act cycles executed
    pub steps_taken: u32,
    /// Result text of the last executed action, if any
    pub last_result: Option<String>,
    /// Failure reason, when status is [`LoopStatus::Failed`]
    pub failure: Option<String>,
}

impl LoopOutcome {
    /// Whether the loop ended because the agent finished its work
    pub fn is_completed(&self) -> bool {
        self.status == LoopStatus::Completed
    }
}

/// Drives an agent through think/act cycles until it signals completion
/// or the step cap is reached
///
/// One driver invocation handles one plan; there is no internal
/// parallelism and no retry. Progress inspection goes through the
/// recorder, not through errors: a failed cycle ends the loop with
/// [`LoopStatus::Failed`] but never panics or propagates.
pub struct ReactLoop {
    max_steps: u32,
}

impl ReactLoop {
    /// Create a driver with the given step cap
    pub fn new(max_steps: u32) -> Self {
        Self { max_steps }
    }

    /// Run the agent to termination
    pub async fn run(&self, agent: &mut dyn ReactAgent) -> LoopOutcome {
        let mut last_result = None;

        for step_number in 1..=self.max_steps {
            let mut cx = StepContext::new(step_number);

            match agent.think(&mut cx).await {
                ThinkOutcome::Action => {
                    let result = agent.act(&mut cx).await;
                    last_result = Some(result);
                }
                ThinkOutcome::Complete => {
                    info!(agent = %agent.name(), steps = step_number, "agent completed");
                    return LoopOutcome {
                        status: LoopStatus::Completed,
                        steps_taken: step_number,
                        last_result,
                        failure: None,
                    };
                }
                ThinkOutcome::Failed(reason) => {
                    warn!(agent = %agent.name(), steps = step_number, %reason, "agent failed");
                    return LoopOutcome {
                        status: LoopStatus::Failed,
                        steps_taken: step_number,
                        last_result,
                        failure: Some(reason),
                    };
                }
            }
        }

        warn!(agent = %agent.name(), max_steps = self.max_steps, "step cap reached");
        LoopOutcome {
            status: LoopStatus::MaxStepsReached,
            steps_taken: self.max_steps,
            last_result,
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::messages::ChatMessage;
    use crate::tools::{ToolCall, ToolCallback};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Agent that proposes an action a fixed number of times, then completes
    struct CountingAgent {
        actions_remaining: u32,
        acts: u32,
        fail_on_think: bool,
    }

    #[async_trait]
    impl ReactAgent for CountingAgent {
        fn name(&self) -> &str {
            "counting"
        }

        fn description(&self) -> &str {
            "test agent"
        }

        fn tool_call_list(&self) -> Vec<Arc<dyn ToolCallback>> {
            Vec::new()
        }

        fn next_step_message(&self) -> ChatMessage {
            ChatMessage::user("next")
        }

        async fn think(&mut self, cx: &mut StepContext) -> ThinkOutcome {
            if self.fail_on_think {
                return ThinkOutcome::Failed("stub failure".to_string());
            }
            if self.actions_remaining == 0 {
                return ThinkOutcome::Complete;
            }
            self.actions_remaining -= 1;
            cx.pending_call = Some(ToolCall::new("id", "noop", HashMap::new()));
            ThinkOutcome::Action
        }

        async fn act(&mut self, _cx: &mut StepContext) -> String {
            self.acts += 1;
            format!("act {}", self.acts)
        }
    }

    #[tokio::test]
    async fn test_completes_when_no_action() {
        let mut agent = CountingAgent {
            actions_remaining: 2,
            acts: 0,
            fail_on_think: false,
        };
        let outcome = ReactLoop::new(10).run(&mut agent).await;

        assert_eq!(outcome.status, LoopStatus::Completed);
        assert_eq!(outcome.steps_taken, 3);
        assert_eq!(agent.acts, 2);
        assert_eq!(outcome.last_result.as_deref(), Some("act 2"));
    }

    #[tokio::test]
    async fn test_step_cap() {
        let mut agent = CountingAgent {
            actions_remaining: 100,
            acts: 0,
            fail_on_think: false,
        };
        let outcome = ReactLoop::new(4).run(&mut agent).await;

        assert_eq!(outcome.status, LoopStatus::MaxStepsReached);
        assert_eq!(outcome.steps_taken, 4);
        assert_eq!(agent.acts, 4);
    }

    #[tokio::test]
    async fn test_failed_think_ends_loop() {
        let mut agent = CountingAgent {
            actions_remaining: 5,
            acts: 0,
            fail_on_think: true,
        };
        let outcome = ReactLoop::new(10).run(&mut agent).await;

        assert_eq!(outcome.status, LoopStatus::Failed);
        assert_eq!(outcome.failure.as_deref(), Some("stub failure"));
        assert_eq!(agent.acts, 0);
    }
}
