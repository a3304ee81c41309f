//! Execution recording: per-cycle audit trail keyed by plan and execution

pub mod entity;
#[allow(clippy::module_inception)]
pub mod recorder;

pub use entity::{AgentExecutionRecord, PlanExecutionRecord, RecordStatus, ThinkActRecord};
pub use recorder::PlanExecutionRecorder;
