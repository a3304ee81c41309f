//! Tool-calling ReAct agent

use crate::advisor::RetrievalAdvisor;
use crate::agent::traits::{ReactAgent, StepContext, ThinkOutcome};
use crate::error::{AgentError, AgentResult};
use crate::llm::client::ChatModel;
use crate::llm::messages::ChatMessage;
use crate::memory::{ChatMemory, InMemoryChatMemory, DEFAULT_RETRIEVE_SIZE};
use crate::prompts::PromptTemplate;
use crate::recorder::{AgentExecutionRecord, PlanExecutionRecorder, RecordStatus};
use crate::tools::{ToolCallback, ToolCallingManager, ToolRegistry};
use crate::types::Id;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// An agent whose capabilities come entirely from its resolved tool list
///
/// The concrete variant behind [`ReactAgent`] for configuration-driven
/// agents: identity, prompts and allow-list arrive as data. One instance
/// serves one plan at a time; per-cycle state lives in the
/// [`StepContext`], never on the instance.
pub struct ToolCallAgent {
    name: String,
    description: String,
    system_prompt: PromptTemplate,
    next_step_prompt: PromptTemplate,
    template_data: HashMap<String, String>,
    manager: ToolCallingManager,
    chat_model: Arc<dyn ChatModel>,
    memory: Arc<dyn ChatMemory>,
    recorder: Arc<PlanExecutionRecorder>,
    advisor: Option<RetrievalAdvisor>,
    plan_id: String,
    conversation_id: String,
    execution_id: Id,
    retrieve_size: usize,
}

impl ToolCallAgent {
    /// Start building an agent
    pub fn builder(name: impl Into<String>) -> ToolCallAgentBuilder {
        ToolCallAgentBuilder::new(name)
    }

    /// Plan this agent is recording under
    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    /// Conversation id scoping this agent's memory
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Recorder key for this agent invocation
    pub fn execution_id(&self) -> Id {
        self.execution_id
    }

    /// Snapshot this agent's execution record
    pub fn execution_record(&self) -> Option<AgentExecutionRecord> {
        self.recorder.agent_execution(&self.plan_id, self.execution_id)
    }

    /// Close out this agent's execution record
    pub fn finish(&self, status: RecordStatus, final_result: Option<String>) -> AgentResult<()> {
        self.recorder
            .finish_agent_execution(&self.plan_id, self.execution_id, status, final_result)
    }

    /// Assemble the message list for one thinking phase
    ///
    /// System prompt, optional retrieval advice, bounded conversation
    /// history, then the next-step message. The next-step message is
    /// returned separately; it is appended to memory only once the model
    /// call succeeds, keeping the log aligned with what the model saw.
    fn build_think_messages(&self) -> (Vec<ChatMessage>, ChatMessage) {
        let next_step = self.next_step_message();

        let mut messages = vec![ChatMessage::system(
            self.system_prompt.render(&self.template_data),
        )];

        if let Some(advisor) = &self.advisor {
            match advisor.advise(&next_step.content) {
                Ok(Some(advised)) => messages.push(advised.message),
                Ok(None) => {}
                Err(err) => {
                    warn!(agent = %self.name, error = %err, "retrieval advice failed, continuing without it")
                }
            }
        }

        messages.extend(self.memory.get(&self.conversation_id, self.retrieve_size));
        messages.push(next_step.clone());

        (messages, next_step)
    }
}

#[async_trait]
impl ReactAgent for ToolCallAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tool_call_list(&self) -> Vec<Arc<dyn ToolCallback>> {
        self.manager.callbacks().to_vec()
    }

    fn next_step_message(&self) -> ChatMessage {
        ChatMessage::user(self.next_step_prompt.render(&self.template_data))
    }

    async fn think(&mut self, cx: &mut StepContext) -> ThinkOutcome {
        let (messages, next_step) = self.build_think_messages();
        let transcript = serde_json::to_string(&messages).unwrap_or_default();

        if let Err(err) =
            self.recorder
                .start_thinking(&self.plan_id, self.execution_id, &transcript)
        {
            return ThinkOutcome::Failed(err.to_string());
        }

        let tools = self.manager.schemas();

        match self.chat_model.chat(&messages, &tools).await {
            Ok(response) => {
                if let Err(err) =
                    self.recorder
                        .finish_thinking(&self.plan_id, self.execution_id, &response.content)
                {
                    warn!(agent = %self.name, error = %err, "failed to record thinking output");
                }

                info!(agent = %self.name, step = cx.step_number, "thoughts: {}", response.content);

                // Memory sees the turn in the order the model produced it:
                // the prompt that asked, then the answer.
                self.memory.add(&self.conversation_id, next_step);
                self.memory.add(
                    &self.conversation_id,
                    ChatMessage::assistant_with_tools(
                        response.content.clone(),
                        response.tool_calls.clone(),
                    ),
                );

                match response.first_tool_call() {
                    Some(first) => {
                        info!(
                            agent = %self.name,
                            proposed = response.tool_calls.len(),
                            tool = %first.name,
                            "selected tool"
                        );
                        if let Err(err) = self.recorder.note_selected_tool(
                            &self.plan_id,
                            self.execution_id,
                            &first.name,
                            first.arguments_json(),
                        ) {
                            warn!(agent = %self.name, error = %err, "failed to record selected tool");
                        }
                        cx.pending_call = Some(first.clone());
                        ThinkOutcome::Action
                    }
                    None => {
                        if let Err(err) =
                            self.recorder.finish_cycle(&self.plan_id, self.execution_id)
                        {
                            warn!(agent = %self.name, error = %err, "failed to close think record");
                        }
                        ThinkOutcome::Complete
                    }
                }
            }
            Err(err) => {
                error!(agent = %self.name, error = %err, "thinking failed");
                if let Err(rec_err) =
                    self.recorder
                        .record_error(&self.plan_id, self.execution_id, &err.to_string())
                {
                    warn!(agent = %self.name, error = %rec_err, "failed to record thinking error");
                }
                ThinkOutcome::Failed(err.to_string())
            }
        }
    }

    async fn act(&mut self, cx: &mut StepContext) -> String {
        let Some(call) = cx.pending_call.take() else {
            warn!(agent = %self.name, "act invoked with no pending tool call");
            return "Error: no pending tool call".to_string();
        };

        let description = format!("Executing tool: {}", call.name);
        if let Err(err) = self.recorder.start_action(
            &self.plan_id,
            self.execution_id,
            &description,
            &call.name,
            call.arguments_json(),
        ) {
            warn!(agent = %self.name, error = %err, "failed to record action start");
        }

        match self.manager.execute_tool_call(&call).await {
            Ok(result) => {
                let message = ToolCallingManager::tool_response_message(&result);
                let text = message.content.clone();
                self.memory.add(&self.conversation_id, message);

                if result.success {
                    info!(agent = %self.name, tool = %call.name, "tool result: {}", text);
                    if let Err(err) = self.recorder.finish_action(
                        &self.plan_id,
                        self.execution_id,
                        &text,
                        RecordStatus::Success,
                    ) {
                        warn!(agent = %self.name, error = %err, "failed to record action result");
                    }
                } else {
                    error!(agent = %self.name, tool = %call.name, "tool failed: {}", text);
                    if let Err(err) =
                        self.recorder
                            .record_error(&self.plan_id, self.execution_id, &text)
                    {
                        warn!(agent = %self.name, error = %err, "failed to record tool error");
                    }
                }

                text
            }
            Err(err) => {
                // Unknown tool or rejected arguments: the model still gets
                // a tool response so it can self-correct next turn.
                let text = format!("Error: {err}");
                self.memory.add(
                    &self.conversation_id,
                    ChatMessage::tool(text.clone(), call.id.clone(), Some(call.name.clone())),
                );
                error!(agent = %self.name, tool = %call.name, "{}", text);
                if let Err(rec_err) =
                    self.recorder
                        .record_error(&self.plan_id, self.execution_id, &err.to_string())
                {
                    warn!(agent = %self.name, error = %rec_err, "failed to record tool error");
                }
                text
            }
        }
    }
}

/// Builder for [`ToolCallAgent`]
pub struct ToolCallAgentBuilder {
    name: String,
    description: String,
    system_prompt: String,
    next_step_prompt: String,
    template_data: HashMap<String, String>,
    available_tools: Vec<String>,
    chat_model: Option<Arc<dyn ChatModel>>,
    memory: Option<Arc<dyn ChatMemory>>,
    recorder: Option<Arc<PlanExecutionRecorder>>,
    advisor: Option<RetrievalAdvisor>,
    plan_id: Option<String>,
    conversation_id: Option<String>,
    retrieve_size: usize,
}

impl ToolCallAgentBuilder {
    /// Create a builder for an agent with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            system_prompt: String::new(),
            next_step_prompt: String::new(),
            template_data: HashMap::new(),
            available_tools: Vec::new(),
            chat_model: None,
            memory: None,
            recorder: None,
            advisor: None,
            plan_id: None,
            conversation_id: None,
            retrieve_size: DEFAULT_RETRIEVE_SIZE,
        }
    }

    /// Set the agent description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the system prompt template
    pub fn system_prompt(mut self, template: impl Into<String>) -> Self {
        self.system_prompt = template.into();
        self
    }

    /// Set the next-step prompt template
    pub fn next_step_prompt(mut self, template: impl Into<String>) -> Self {
        self.next_step_prompt = template.into();
        self
    }

    /// Add a template data entry, substituted into both prompts
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_data.insert(key.into(), value.into());
        self
    }

    /// Set the tool allow-list, in advertisement order
    pub fn available_tools(mut self, tools: Vec<String>) -> Self {
        self.available_tools = tools;
        self
    }

    /// Set the chat model (required)
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Set the conversation memory; defaults to a fresh in-process store
    pub fn memory(mut self, memory: Arc<dyn ChatMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Set the recorder; defaults to a fresh recorder
    pub fn recorder(mut self, recorder: Arc<PlanExecutionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Attach a retrieval advisor
    pub fn advisor(mut self, advisor: RetrievalAdvisor) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Set the plan id; defaults to a fresh UUID
    pub fn plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    /// Set the conversation id; defaults to the plan id
    pub fn conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Set the number of history messages retrieved per prompt
    pub fn retrieve_size(mut self, retrieve_size: usize) -> Self {
        self.retrieve_size = retrieve_size;
        self
    }

    /// Resolve the allow-list against the registry and build the agent
    ///
    /// Opens the agent's execution record with the recorder; every
    /// think/act cycle of this instance is keyed under it.
    pub fn build(self, registry: &ToolRegistry) -> AgentResult<ToolCallAgent> {
        let chat_model = self
            .chat_model
            .ok_or_else(|| AgentError::config("agent requires a chat model"))?;

        let memory = self
            .memory
            .unwrap_or_else(|| Arc::new(InMemoryChatMemory::new()));
        let recorder = self.recorder.unwrap_or_default();
        let plan_id = self
            .plan_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let conversation_id = self.conversation_id.unwrap_or_else(|| plan_id.clone());

        let callbacks = registry.resolve(&self.available_tools);
        let execution_id = recorder.start_agent_execution(&plan_id, &self.name, &self.description);

        Ok(ToolCallAgent {
            name: self.name,
            description: self.description,
            system_prompt: PromptTemplate::new(self.system_prompt),
            next_step_prompt: PromptTemplate::new(self.next_step_prompt),
            template_data: self.template_data,
            manager: ToolCallingManager::new(callbacks),
            chat_model,
            memory,
            recorder,
            advisor: self.advisor,
            plan_id,
            conversation_id,
            execution_id,
            retrieve_size: self.retrieve_size,
        })
    }
}
