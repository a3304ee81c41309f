//! Plan execution recorder

use crate::error::{AgentError, AgentResult};
use crate::recorder::entity::{
    AgentExecutionRecord, PlanExecutionRecord, RecordStatus, ThinkActRecord,
};
use crate::types::Id;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// Append-only, per-cycle audit trail keyed by plan id and execution id
///
/// Multiple agents and plans record concurrently without interleaving
/// corruption as long as one agent instance is not shared across
/// concurrent plans: every mutation targets the open record of one
/// (plan, execution) pair under the interior lock.
pub struct PlanExecutionRecorder {
    plans: Mutex<HashMap<String, PlanExecutionRecord>>,
}

impl PlanExecutionRecorder {
    /// Create a new recorder
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
        }
    }

    /// Start recording an agent execution within a plan
    ///
    /// Creates the plan record on first use and returns the execution id
    /// used to key every subsequent call for this invocation.
    pub fn start_agent_execution(
        &self,
        plan_id: &str,
        agent_name: &str,
        agent_description: &str,
    ) -> Id {
        let mut plans = self.plans.lock();
        let plan = plans
            .entry(plan_id.to_string())
            .or_insert_with(|| PlanExecutionRecord::new(plan_id));

        let execution = AgentExecutionRecord::new(agent_name, agent_description);
        let execution_id = execution.id;
        plan.agent_executions.push(execution);
        execution_id
    }

    /// Open a new think/act record with the thinking transcript
    pub fn start_thinking(
        &self,
        plan_id: &str,
        execution_id: Id,
        transcript: &str,
    ) -> AgentResult<Id> {
        self.with_execution(plan_id, execution_id, |execution| {
            let record = ThinkActRecord::start_thinking(execution.id, transcript);
            let record_id = record.id;
            execution.add_record(record);
            record_id
        })
    }

    /// Close the thinking phase of the open record
    pub fn finish_thinking(&self, plan_id: &str, execution_id: Id, output: &str) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.finish_thinking(output);
        })
    }

    /// Note the tool selected during the thinking phase
    pub fn note_selected_tool(
        &self,
        plan_id: &str,
        execution_id: Id,
        tool_name: &str,
        args: serde_json::Value,
    ) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.note_selected_tool(tool_name, args);
        })
    }

    /// Close the open record for a cycle that proposed no action
    pub fn finish_cycle(&self, plan_id: &str, execution_id: Id) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.finish_without_action();
        })
    }

    /// Open the acting phase of the open record
    pub fn start_action(
        &self,
        plan_id: &str,
        execution_id: Id,
        description: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.start_action(description, tool_name, args);
        })
    }

    /// Close the acting phase of the open record
    pub fn finish_action(
        &self,
        plan_id: &str,
        execution_id: Id,
        result: &str,
        status: RecordStatus,
    ) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.finish_action(result, status);
        })
    }

    /// Capture an error on the open record and close it
    pub fn record_error(&self, plan_id: &str, execution_id: Id, message: &str) -> AgentResult<()> {
        self.with_current_record(plan_id, execution_id, |record| {
            record.record_error(message);
        })
    }

    /// Mark an agent execution finished
    pub fn finish_agent_execution(
        &self,
        plan_id: &str,
        execution_id: Id,
        status: RecordStatus,
        final_result: Option<String>,
    ) -> AgentResult<()> {
        self.with_execution(plan_id, execution_id, |execution| {
            execution.complete(status, final_result);
        })
    }

    /// Snapshot an agent execution record
    pub fn agent_execution(&self, plan_id: &str, execution_id: Id) -> Option<AgentExecutionRecord> {
        self.plans
            .lock()
            .get(plan_id)
            .and_then(|plan| plan.execution(execution_id))
            .cloned()
    }

    /// Snapshot a whole plan record
    pub fn plan_record(&self, plan_id: &str) -> Option<PlanExecutionRecord> {
        self.plans.lock().get(plan_id).cloned()
    }

    /// Serialize a plan record to pretty JSON
    pub fn export_plan(&self, plan_id: &str) -> AgentResult<String> {
        let plans = self.plans.lock();
        let plan = plans
            .get(plan_id)
            .ok_or_else(|| AgentError::recorder(format!("unknown plan: {plan_id}")))?;
        Ok(serde_json::to_string_pretty(plan)?)
    }

    /// Write a plan record to a JSON file
    pub fn save_plan<P: AsRef<Path>>(&self, plan_id: &str, path: P) -> AgentResult<()> {
        let json = self.export_plan(plan_id)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn with_execution<R>(
        &self,
        plan_id: &str,
        execution_id: Id,
        f: impl FnOnce(&mut AgentExecutionRecord) -> R,
    ) -> AgentResult<R> {
        let mut plans = self.plans.lock();
        let plan = plans
            .get_mut(plan_id)
            .ok_or_else(|| AgentError::recorder(format!("unknown plan: {plan_id}")))?;
        let execution = plan.execution_mut(execution_id).ok_or_else(|| {
            AgentError::recorder(format!("unknown execution {execution_id} in plan {plan_id}"))
        })?;
        Ok(f(execution))
    }

    fn with_current_record(
        &self,
        plan_id: &str,
        execution_id: Id,
        f: impl FnOnce(&mut ThinkActRecord),
    ) -> AgentResult<()> {
        self.with_execution(plan_id, execution_id, |execution| {
            match execution.current_record_mut() {
                Some(record) => {
                    f(record);
                    Ok(())
                }
                None => Err(AgentError::recorder("no open think/act record")),
            }
        })?
    }
}

impl Default for PlanExecutionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
