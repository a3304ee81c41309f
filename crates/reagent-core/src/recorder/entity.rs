//! Record entities for the execution audit trail

use crate::types::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The recorded phase is still open
    Running,
    /// The cycle or execution finished normally
    Success,
    /// The cycle or execution captured an error
    Error,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Running => write!(f, "RUNNING"),
            RecordStatus::Success => write!(f, "SUCCESS"),
            RecordStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Audit entry for one think/act cycle
///
/// Opened at the start of think(), mutated through the cycle, and final
/// once the acting phase closes or an error is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkActRecord {
    /// Unique identifier for this record
    pub id: Id,
    /// Agent execution this record belongs to
    pub parent_execution_id: Id,
    /// When the thinking phase opened
    pub started_at: DateTime<Utc>,
    /// When the cycle closed
    pub completed_at: Option<DateTime<Utc>>,
    /// Prompt transcript fed into the model
    pub thinking_input: Option<String>,
    /// Free-text output of the thinking phase
    pub thinking_output: Option<String>,
    /// Whether the model proposed a tool call this cycle
    pub action_needed: bool,
    /// Human-readable description of the action taken
    pub action_description: Option<String>,
    /// Name of the selected tool
    pub tool_name: Option<String>,
    /// Arguments of the selected tool call
    pub tool_parameters: Option<serde_json::Value>,
    /// Textual result of the action
    pub action_result: Option<String>,
    /// Cycle status
    pub status: RecordStatus,
    /// Error message, if the cycle captured one
    pub error_message: Option<String>,
}

impl ThinkActRecord {
    /// Open a new record with the thinking transcript
    pub fn start_thinking(parent_execution_id: Id, thinking_input: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            parent_execution_id,
            started_at: Utc::now(),
            completed_at: None,
            thinking_input: Some(thinking_input.into()),
            thinking_output: None,
            action_needed: false,
            action_description: None,
            tool_name: None,
            tool_parameters: None,
            action_result: None,
            status: RecordStatus::Running,
            error_message: None,
        }
    }

    /// Close the thinking phase with the model's output
    pub fn finish_thinking(&mut self, output: impl Into<String>) {
        self.thinking_output = Some(output.into());
        self.status = RecordStatus::Success;
    }

    /// Note the tool the model selected for this cycle
    pub fn note_selected_tool(&mut self, tool_name: impl Into<String>, args: serde_json::Value) {
        self.action_needed = true;
        self.tool_name = Some(tool_name.into());
        self.tool_parameters = Some(args);
    }

    /// Close a cycle that proposed no action
    pub fn finish_without_action(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Open the acting phase
    pub fn start_action(
        &mut self,
        description: impl Into<String>,
        tool_name: impl Into<String>,
        args: serde_json::Value,
    ) {
        self.action_description = Some(description.into());
        self.tool_name = Some(tool_name.into());
        self.tool_parameters = Some(args);
    }

    /// Close the acting phase with the action's result
    pub fn finish_action(&mut self, result: impl Into<String>, status: RecordStatus) {
        self.action_result = Some(result.into());
        self.status = status;
        self.completed_at = Some(Utc::now());
    }

    /// Capture an error and close the record
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status = RecordStatus::Error;
        self.completed_at = Some(Utc::now());
    }

    /// Check whether the record can still be mutated
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Ordered sequence of think/act records for one agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecutionRecord {
    /// Unique identifier for this execution
    pub id: Id,
    /// Agent name
    pub agent_name: String,
    /// Agent description
    pub agent_description: String,
    /// When the execution started
    pub started_at: DateTime<Utc>,
    /// When the execution finished
    pub completed_at: Option<DateTime<Utc>>,
    /// Think/act cycles, in execution order
    pub think_act_records: Vec<ThinkActRecord>,
    /// Execution status
    pub status: RecordStatus,
    /// Final textual result, if any
    pub final_result: Option<String>,
}

impl AgentExecutionRecord {
    /// Create a new execution record
    pub fn new(agent_name: impl Into<String>, agent_description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            agent_name: agent_name.into(),
            agent_description: agent_description.into(),
            started_at: Utc::now(),
            completed_at: None,
            think_act_records: Vec::new(),
            status: RecordStatus::Running,
            final_result: None,
        }
    }

    /// Append a think/act record
    pub fn add_record(&mut self, record: ThinkActRecord) {
        self.think_act_records.push(record);
    }

    /// Get the currently open (last) record mutably
    pub fn current_record_mut(&mut self) -> Option<&mut ThinkActRecord> {
        self.think_act_records.last_mut()
    }

    /// Mark the execution finished
    pub fn complete(&mut self, status: RecordStatus, final_result: Option<String>) {
        self.status = status;
        self.final_result = final_result;
        self.completed_at = Some(Utc::now());
    }

    /// Number of cycles that captured errors
    pub fn error_count(&self) -> usize {
        self.think_act_records
            .iter()
            .filter(|r| r.status == RecordStatus::Error)
            .count()
    }
}

/// Plan-level aggregate of agent executions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExecutionRecord {
    /// Plan identifier
    pub plan_id: String,
    /// When the plan started recording
    pub started_at: DateTime<Utc>,
    /// Agent executions within this plan, in start order
    pub agent_executions: Vec<AgentExecutionRecord>,
}

impl PlanExecutionRecord {
    /// Create a new plan record
    pub fn new(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            started_at: Utc::now(),
            agent_executions: Vec::new(),
        }
    }

    /// Find an agent execution by id
    pub fn execution(&self, execution_id: Id) -> Option<&AgentExecutionRecord> {
        self.agent_executions.iter().find(|e| e.id == execution_id)
    }

    /// Find an agent execution by id, mutably
    pub fn execution_mut(&mut self, execution_id: Id) -> Option<&mut AgentExecutionRecord> {
        self.agent_executions
            .iter_mut()
            .find(|e| e.id == execution_id)
    }
}
