//! Chat model boundary and the OpenAI-compatible HTTP client

use crate::config::ModelConfig;
use crate::error::{AgentError, AgentResult};
use crate::llm::messages::{ChatMessage, ChatResponse, MessageRole};
use crate::tools::types::{ToolCall, ToolSchema};
use crate::types::TokenUsage;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Prompt-completion boundary to the external model provider
///
/// Accepts an ordered message list and a tool definition set, and returns
/// a response that may carry tool-call proposals and/or free text. Tool
/// auto-execution is structurally disabled: implementations only return
/// proposals, the loop controls execution.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a chat request and return the model's response
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> AgentResult<ChatResponse>;
}

/// Chat client for OpenAI-compatible providers
///
/// Speaks the `/chat/completions` wire format with bearer authentication.
/// Cancellation and timeout live here, at the HTTP layer; the agent loop
/// implements neither.
pub struct OpenAiCompatClient {
    config: ModelConfig,
    http_client: Client,
}

impl OpenAiCompatClient {
    /// Create a new client from model configuration
    pub fn new(config: ModelConfig) -> AgentResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn build_request_body(&self, messages: &[ChatMessage], tools: &[ToolSchema]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages_to_wire(messages),
        });

        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if !tools.is_empty() {
            body["tools"] = json!(tools_to_wire(tools));
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> AgentResult<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = self.build_request_body(messages, tools);

        debug!(model = %self.config.model, message_count = messages.len(), "sending chat request");

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(api_key) = self.config.resolve_api_key() {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::llm(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::llm(format!(
                "chat API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| AgentError::llm(format!("failed to parse chat response: {e}")))?;

        parse_chat_response(response_json)
    }
}

/// Convert messages to the OpenAI chat wire format
fn messages_to_wire(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content,
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.content,
            }),
            MessageRole::Assistant => {
                let mut wire = json!({
                    "role": "assistant",
                    "content": msg.content,
                });
                if let Some(calls) = &msg.tool_calls {
                    wire["tool_calls"] = Value::Array(
                        calls
                            .iter()
                            .map(|call| {
                                json!({
                                    "id": call.id,
                                    "type": "function",
                                    "function": {
                                        "name": call.name,
                                        "arguments": serde_json::to_string(&call.arguments)
                                            .unwrap_or_else(|_| "{}".to_string()),
                                    },
                                })
                            })
                            .collect(),
                    );
                }
                wire
            }
            MessageRole::Tool => {
                let mut wire = json!({
                    "role": "tool",
                    "content": msg.content,
                    "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                });
                if let Some(name) = &msg.name {
                    wire["name"] = json!(name);
                }
                wire
            }
        })
        .collect()
}

/// Convert tool schemas to the OpenAI function-tool wire format
fn tools_to_wire(tools: &[ToolSchema]) -> Vec<Value> {
    tools
        .iter()
        .map(|schema| {
            json!({
                "type": "function",
                "function": {
                    "name": schema.name,
                    "description": schema.description,
                    "parameters": schema.parameters,
                },
            })
        })
        .collect()
}

/// Parse an OpenAI-compatible chat completion response
fn parse_chat_response(response: Value) -> AgentResult<ChatResponse> {
    let choice = response
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| AgentError::llm("chat response missing choices"))?;

    let message = choice
        .get("message")
        .ok_or_else(|| AgentError::llm("chat response missing message"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let function = call.get("function").cloned().unwrap_or_default();
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let arguments = function
                .get("arguments")
                .and_then(Value::as_str)
                .map(parse_tool_arguments)
                .unwrap_or_default();

            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    let usage = response.get("usage").map(|u| {
        TokenUsage::new(
            u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            u.get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        )
    });

    Ok(ChatResponse {
        content,
        tool_calls,
        model: response
            .get("model")
            .and_then(Value::as_str)
            .map(String::from),
        finish_reason: choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(String::from),
        usage,
    })
}

/// Parse the JSON-string arguments of a proposed tool call
///
/// Malformed arguments degrade to an empty map; the tool's own validation
/// then rejects the call with a message the model can act on.
fn parse_tool_arguments(raw: &str) -> HashMap<String, Value> {
    match serde_json::from_str(raw) {
        Ok(args) => args,
        Err(e) => {
            warn!(error = %e, "failed to parse tool call arguments, treating as empty");
            HashMap::new()
        }
    }
}
