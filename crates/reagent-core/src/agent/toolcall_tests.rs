//! End-to-end tests driving [`ToolCallAgent`] through scripted model turns

use crate::agent::driver::{LoopStatus, ReactLoop};
use crate::agent::toolcall::ToolCallAgent;
use crate::agent::traits::{ReactAgent, StepContext, ThinkOutcome};
use crate::error::{AgentError, AgentResult};
use crate::llm::client::ChatModel;
use crate::llm::messages::{ChatMessage, ChatResponse, MessageRole};
use crate::memory::{ChatMemory, InMemoryChatMemory};
use crate::recorder::{PlanExecutionRecorder, RecordStatus, ThinkActRecord};
use crate::tools::{
    ToolCall, ToolCallback, ToolError, ToolParameter, ToolRegistry, ToolResult, ToolSchema,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Chat model that replays a scripted sequence of responses
struct ScriptedChatModel {
    responses: Mutex<VecDeque<ChatResponse>>,
}

impl ScriptedChatModel {
    fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> AgentResult<ChatResponse> {
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| AgentError::llm("script exhausted"))
    }
}

/// Chat model whose every call fails
struct UnreachableChatModel;

#[async_trait]
impl ChatModel for UnreachableChatModel {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> AgentResult<ChatResponse> {
        Err(AgentError::llm("provider unreachable"))
    }
}

/// Tool that counts its invocations and echoes the query back
struct SearchTool {
    invocations: AtomicUsize,
}

impl SearchTool {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            invocations: AtomicUsize::new(0),
        })
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolCallback for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search for documents"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "search",
            "Search for documents",
            vec![ToolParameter::string("q", "Search query")],
        )
    }

    async fn call(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let q = call
            .get_string("q")
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'q' parameter".to_string()))?;
        Ok(ToolResult::success(
            &call.id,
            self.name(),
            format!("results for {q}"),
        ))
    }
}

/// Tool that always reports a failure
struct FlakyTool;

#[async_trait]
impl ToolCallback for FlakyTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "Always times out"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("flaky", "Always times out", vec![])
    }

    async fn call(&self, _call: &ToolCall) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed("upstream timeout".to_string()))
    }
}

fn search_call(id: &str, q: &str) -> ToolCall {
    let mut args = HashMap::new();
    args.insert("q".to_string(), serde_json::json!(q));
    ToolCall::new(id, "search", args)
}

fn build_agent(
    registry: &ToolRegistry,
    allow_list: Vec<&str>,
    model: Arc<dyn ChatModel>,
    memory: Arc<InMemoryChatMemory>,
    recorder: Arc<PlanExecutionRecorder>,
) -> ToolCallAgent {
    ToolCallAgent::builder("researcher")
        .description("looks things up")
        .system_prompt("You are {name}, a careful researcher.")
        .next_step_prompt("Work on the task: {task}")
        .data("name", "researcher")
        .data("task", "find rust agents")
        .available_tools(allow_list.into_iter().map(String::from).collect())
        .chat_model(model)
        .memory(memory)
        .recorder(recorder)
        .plan_id("plan-1")
        .build(registry)
        .unwrap()
}

fn cycle_records(agent: &ToolCallAgent) -> Vec<ThinkActRecord> {
    agent
        .execution_record()
        .expect("execution record must exist")
        .think_act_records
}

#[tokio::test]
async fn test_tool_free_response_completes_without_acting() {
    let search = SearchTool::new();
    let mut registry = ToolRegistry::new();
    registry.register(search.clone());

    let model = ScriptedChatModel::new(vec![ChatResponse::new("The answer is 42.")]);
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec!["search"],
        model,
        memory.clone(),
        recorder.clone(),
    );

    let outcome = ReactLoop::new(5).run(&mut agent).await;

    assert_eq!(outcome.status, LoopStatus::Completed);
    assert_eq!(outcome.steps_taken, 1);
    assert!(outcome.last_result.is_none());
    assert_eq!(search.invocations(), 0);

    let records = cycle_records(&agent);
    assert_eq!(records.len(), 1);
    assert!(!records[0].action_needed);
    assert_eq!(records[0].thinking_output.as_deref(), Some("The answer is 42."));
    // The cycle is over even though no action phase ran.
    assert!(!records[0].is_open());
    assert_eq!(records[0].status, RecordStatus::Success);
}

#[tokio::test]
async fn test_only_first_proposed_call_executes() {
    let search = SearchTool::new();
    let other = SearchTool::new();
    struct Renamed(Arc<SearchTool>);

    #[async_trait]
    impl ToolCallback for Renamed {
        fn name(&self) -> &str {
            "lookup"
        }
        fn description(&self) -> &str {
            self.0.description()
        }
        fn schema(&self) -> ToolSchema {
            ToolSchema::new("lookup", self.0.description(), vec![])
        }
        async fn call(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
            self.0.call(call).await
        }
    }

    let mut registry = ToolRegistry::new();
    registry.register(search.clone());
    registry.register(Arc::new(Renamed(other.clone())));

    let mut second_args = HashMap::new();
    second_args.insert("q".to_string(), serde_json::json!("ignored"));
    let response = ChatResponse::with_tool_calls(
        "I will search first.",
        vec![
            search_call("call-1", "rust agents"),
            ToolCall::new("call-2", "lookup", second_args),
        ],
    );

    let model = ScriptedChatModel::new(vec![response]);
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec!["search", "lookup"],
        model,
        memory.clone(),
        recorder.clone(),
    );

    let mut cx = StepContext::new(1);
    assert_eq!(agent.think(&mut cx).await, ThinkOutcome::Action);
    let result = agent.act(&mut cx).await;

    assert_eq!(result, "results for rust agents");
    assert_eq!(search.invocations(), 1);
    assert_eq!(other.invocations(), 0);

    // The tool response in memory answers the first proposed call only.
    let history = memory.get(agent.conversation_id(), 100);
    let tool_msg = history
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool response message in memory");
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call-1"));
}

#[tokio::test]
async fn test_failing_tool_surfaces_error_in_memory_and_result() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FlakyTool));

    let response = ChatResponse::with_tool_calls(
        "Trying the flaky tool.",
        vec![ToolCall::new("call-1", "flaky", HashMap::new())],
    );
    let model = ScriptedChatModel::new(vec![response, ChatResponse::new("Giving up.")]);
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec!["flaky"],
        model,
        memory.clone(),
        recorder.clone(),
    );

    let outcome = ReactLoop::new(5).run(&mut agent).await;

    assert_eq!(outcome.status, LoopStatus::Completed);
    let last = outcome.last_result.expect("act ran once");
    assert!(last.starts_with("Error:"));
    assert!(last.contains("upstream timeout"));

    let history = memory.get(agent.conversation_id(), 100);
    let tool_msg = history
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool response message in memory");
    assert!(tool_msg.content.starts_with("Error:"));

    let records = cycle_records(&agent);
    assert_eq!(records[0].status, RecordStatus::Error);
    assert!(records[0]
        .error_message
        .as_deref()
        .is_some_and(|m| m.contains("upstream timeout")));
}

#[tokio::test]
async fn test_unlisted_tool_proposal_degrades_to_error_response() {
    let mut registry = ToolRegistry::new();
    registry.register(SearchTool::new());

    // The model hallucinates a tool outside the agent's allow-list.
    let response = ChatResponse::with_tool_calls(
        "Let me delete everything.",
        vec![ToolCall::new("call-1", "shell", HashMap::new())],
    );
    let model = ScriptedChatModel::new(vec![response]);
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec!["search"],
        model,
        memory.clone(),
        recorder.clone(),
    );

    let mut cx = StepContext::new(1);
    assert_eq!(agent.think(&mut cx).await, ThinkOutcome::Action);
    let result = agent.act(&mut cx).await;

    assert!(result.starts_with("Error:"));
    let history = memory.get(agent.conversation_id(), 100);
    let tool_msg = history
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool response message in memory");
    assert!(tool_msg.content.contains("shell"));
}

#[tokio::test]
async fn test_provider_failure_fails_the_loop() {
    let registry = ToolRegistry::new();
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec![],
        Arc::new(UnreachableChatModel),
        memory.clone(),
        recorder.clone(),
    );

    let outcome = ReactLoop::new(5).run(&mut agent).await;

    assert_eq!(outcome.status, LoopStatus::Failed);
    assert!(outcome
        .failure
        .as_deref()
        .is_some_and(|f| f.contains("provider unreachable")));
    // Nothing reached memory; the model never answered.
    assert!(memory.is_empty(agent.conversation_id()));

    let records = cycle_records(&agent);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, RecordStatus::Error);
}

#[tokio::test]
async fn test_search_scenario_end_to_end() {
    let search = SearchTool::new();
    let mut registry = ToolRegistry::new();
    registry.register(search.clone());

    let model = ScriptedChatModel::new(vec![
        ChatResponse::with_tool_calls(
            "Searching for rust agents.",
            vec![search_call("call-1", "rust agents")],
        ),
        ChatResponse::new("Found them."),
    ]);
    let memory = Arc::new(InMemoryChatMemory::new());
    let recorder = Arc::new(PlanExecutionRecorder::new());
    let mut agent = build_agent(
        &registry,
        vec!["search"],
        model,
        memory.clone(),
        recorder.clone(),
    );

    let outcome = ReactLoop::new(5).run(&mut agent).await;
    agent
        .finish(RecordStatus::Success, outcome.last_result.clone())
        .unwrap();

    assert_eq!(outcome.status, LoopStatus::Completed);
    assert_eq!(outcome.steps_taken, 2);
    assert_eq!(outcome.last_result.as_deref(), Some("results for rust agents"));
    assert_eq!(search.invocations(), 1);

    let execution = agent.execution_record().unwrap();
    assert_eq!(execution.status, RecordStatus::Success);
    assert_eq!(execution.think_act_records.len(), 2);

    let first = &execution.think_act_records[0];
    assert!(first.action_needed);
    assert_eq!(first.tool_name.as_deref(), Some("search"));
    assert_eq!(first.action_result.as_deref(), Some("results for rust agents"));
    assert_eq!(first.status, RecordStatus::Success);
    assert!(!execution.think_act_records[1].action_needed);

    // Memory holds both turns: prompt, assistant, tool response, prompt,
    // final answer.
    let history = memory.get(agent.conversation_id(), 100);
    assert_eq!(history.len(), 5);
    assert_eq!(history[2].role, MessageRole::Tool);
    assert_eq!(history[2].content, "results for rust agents");
}

#[tokio::test]
async fn test_replays_with_identical_scripts_match() {
    async fn run_once() -> Vec<ThinkActRecord> {
        let search = SearchTool::new();
        let mut registry = ToolRegistry::new();
        registry.register(search);

        let model = ScriptedChatModel::new(vec![
            ChatResponse::with_tool_calls(
                "Searching for rust agents.",
                vec![search_call("call-1", "rust agents")],
            ),
            ChatResponse::new("Found them."),
        ]);
        let memory = Arc::new(InMemoryChatMemory::new());
        let recorder = Arc::new(PlanExecutionRecorder::new());
        let mut agent = build_agent(&registry, vec!["search"], model, memory, recorder);

        ReactLoop::new(5).run(&mut agent).await;
        cycle_records(&agent)
    }

    let first = run_once().await;
    let second = run_once().await;

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.action_needed, b.action_needed);
        assert_eq!(a.thinking_output, b.thinking_output);
        assert_eq!(a.tool_name, b.tool_name);
        assert_eq!(a.tool_parameters, b.tool_parameters);
        assert_eq!(a.action_result, b.action_result);
        assert_eq!(a.error_message, b.error_message);
    }
}
