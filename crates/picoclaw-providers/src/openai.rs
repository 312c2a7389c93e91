//! OpenAI Chat Completions provider ("inline-message" wire style).
//!
//! Every message, tool results included, stays inline in one ordered list.
//! Tool calls ride on the assistant message with JSON-encoded arguments, and
//! tool results carry `tool_call_id` as a sibling field. OpenRouter reuses
//! this client unchanged (see [`crate::openrouter`]).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use picoclaw_core::error::ProviderError;
use picoclaw_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};

use crate::http::{self, REQUEST_TIMEOUT};
use crate::traits::{LlmProvider, LlmRequestConfig};
use crate::usage::{self, RawUsage};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

// ─────────────────────────────────────────────
// Wire types (request)
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: WireFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    /// JSON-encoded argument object.
    arguments: String,
}

// ─────────────────────────────────────────────
// Wire types (response)
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<RawUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    /// Usually a JSON string; some compatible servers send an object.
    #[serde(default)]
    arguments: Value,
}

// ─────────────────────────────────────────────
// Translation
// ─────────────────────────────────────────────

fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|msg| WireMessage {
            role: msg.role(),
            content: msg.content(),
            tool_calls: msg
                .tool_calls()
                .iter()
                .map(|tc| WireToolCall {
                    id: &tc.id,
                    call_type: "function",
                    function: WireFunctionCall {
                        name: &tc.name,
                        arguments: serde_json::to_string(&tc.arguments)
                            .unwrap_or_else(|_| "{}".to_string()),
                    },
                })
                .collect(),
            tool_call_id: msg.tool_call_id(),
        })
        .collect()
}

/// Decode tool-call arguments: a JSON string (empty means no arguments) or a
/// bare object.
fn parse_arguments(raw: Value) -> Result<HashMap<String, Value>, String> {
    match raw {
        Value::String(s) if s.trim().is_empty() => Ok(HashMap::new()),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(other) => Err(format!("arguments are not a JSON object: {other}")),
            Err(e) => Err(format!("arguments are not valid JSON: {e}")),
        },
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(HashMap::new()),
        other => Err(format!("unexpected arguments value: {other}")),
    }
}

fn parse_response(provider: &str, body: &str) -> Result<LlmResponse, ProviderError> {
    let resp: ChatCompletionResponse = http::parse_body(provider, body)?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| http::invalid_response(provider, "response has no choices", body))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| -> Result<ToolCall, ProviderError> {
            let arguments = parse_arguments(tc.function.arguments).map_err(|msg| {
                http::invalid_response(
                    provider,
                    format!("tool call '{}': {msg}", tc.function.name),
                    body,
                )
            })?;
            Ok(ToolCall::new(tc.id, tc.function.name, arguments))
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        usage: usage::normalize(resp.usage),
    })
}

// ─────────────────────────────────────────────
// OpenAiProvider
// ─────────────────────────────────────────────

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    display_name: &'static str,
    /// Extra headers sent with each request (OpenRouter attribution).
    extra_headers: HeaderMap,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.display_name)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http::build_client(REQUEST_TIMEOUT),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.to_string(),
            display_name: "OpenAI",
            extra_headers: HeaderMap::new(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_display_name(mut self, name: &'static str) -> Self {
        self.display_name = name;
        self
    }

    /// Add a header to every request. Invalid names or values are skipped.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(val)) => {
                self.extra_headers.insert(name, val);
            }
            _ => warn!("Invalid header: {}={}", key, value),
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http::build_client(timeout);
        self.timeout = timeout;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        let model = if model.is_empty() {
            self.default_model.as_str()
        } else {
            model
        };

        debug!(
            provider = self.display_name,
            model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model,
            messages: to_wire_messages(messages),
            max_tokens: config.max_tokens,
            tools: tools.filter(|t| !t.is_empty()),
            temperature: config.temperature,
        };

        let request = self
            .client
            .post(http::endpoint(&self.api_base, "chat/completions"))
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body);

        let body = http::send(self.display_name, self.timeout, request).await?;
        let resp = parse_response(self.display_name, &body)?;

        debug!(
            provider = self.display_name,
            tool_calls = resp.tool_calls.len(),
            finish_reason = %resp.finish_reason,
            total_tokens = resp.usage.total_tokens,
            "LLM response received"
        );
        Ok(resp)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.display_name
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
