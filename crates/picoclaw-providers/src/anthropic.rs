//! Anthropic Messages API provider ("system-out-of-band" wire style).
//!
//! - The system prompt travels in a separate `system` field.
//! - Tool results are `tool_result` blocks inside a user turn, addressed by `tool_use_id`.
//! - Assistant tool calls are `tool_use` blocks, after an optional `text` block.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use picoclaw_core::error::ProviderError;
use picoclaw_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};

use crate::http::{self, REQUEST_TIMEOUT};
use crate::traits::{LlmProvider, LlmRequestConfig};
use crate::usage::{self, RawUsage};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const API_VERSION: &str = "2023-06-01";

const DISPLAY_NAME: &str = "Anthropic";

// ─────────────────────────────────────────────
// Wire types (request)
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireMessage<'a> {
    role: &'static str,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Blocks(Vec<ContentBlock<'a>>),
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: &'a HashMap<String, Value>,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
    },
}

#[derive(Debug, Serialize, PartialEq)]
struct WireTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

// ─────────────────────────────────────────────
// Wire types (response)
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<RawUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

// ─────────────────────────────────────────────
// Translation
// ─────────────────────────────────────────────

/// Split the internal message list into the out-of-band system prompt and
/// the vendor message array.
///
/// Multiple system messages are joined with a blank line. Consecutive tool
/// results are merged into one user turn, since the API requires user and
/// assistant turns to alternate.
fn to_wire_messages(messages: &[Message]) -> (Option<String>, Vec<WireMessage<'_>>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut wire: Vec<WireMessage<'_>> = Vec::with_capacity(messages.len());
    let mut last_was_tool = false;

    for msg in messages {
        match msg {
            Message::System { content } => {
                system_parts.push(content);
                continue;
            }
            Message::User { content } => wire.push(WireMessage {
                role: "user",
                content: WireContent::Text(content),
            }),
            Message::Assistant {
                content,
                tool_calls,
            } if tool_calls.is_empty() => {
                // The API rejects empty assistant text; there is nothing to send.
                if content.is_empty() {
                    continue;
                }
                wire.push(WireMessage {
                    role: "assistant",
                    content: WireContent::Text(content),
                });
            }
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
                if !content.is_empty() {
                    blocks.push(ContentBlock::Text { text: content });
                }
                blocks.extend(tool_calls.iter().map(|tc| ContentBlock::ToolUse {
                    id: &tc.id,
                    name: &tc.name,
                    input: &tc.arguments,
                }));
                wire.push(WireMessage {
                    role: "assistant",
                    content: WireContent::Blocks(blocks),
                });
            }
            Message::Tool {
                content,
                tool_call_id,
            } => {
                let block = ContentBlock::ToolResult {
                    tool_use_id: tool_call_id,
                    content,
                };
                if last_was_tool {
                    if let Some(WireMessage {
                        content: WireContent::Blocks(blocks),
                        ..
                    }) = wire.last_mut()
                    {
                        blocks.push(block);
                        continue;
                    }
                }
                wire.push(WireMessage {
                    role: "user",
                    content: WireContent::Blocks(vec![block]),
                });
                last_was_tool = true;
                continue;
            }
        }
        last_was_tool = false;
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, wire)
}

fn to_wire_tools(tools: &[ToolDefinition]) -> Vec<WireTool<'_>> {
    tools
        .iter()
        .map(|t| WireTool {
            name: &t.function.name,
            description: &t.function.description,
            input_schema: &t.function.parameters,
        })
        .collect()
}

fn parse_response(body: &str) -> Result<LlmResponse, ProviderError> {
    let resp: MessagesResponse = http::parse_body(DISPLAY_NAME, body)?;

    let mut texts: Vec<String> = Vec::new();
    let mut tool_calls = Vec::new();

    for block in resp.content {
        match block {
            ResponseBlock::Text { text } => texts.push(text),
            ResponseBlock::ToolUse { id, name, input } => {
                let arguments = match input {
                    Value::Object(map) => map.into_iter().collect(),
                    Value::Null => HashMap::new(),
                    other => {
                        return Err(http::invalid_response(
                            DISPLAY_NAME,
                            format!("tool_use input for '{name}' is not an object: {other}"),
                            body,
                        ))
                    }
                };
                tool_calls.push(ToolCall::new(id, name, arguments));
            }
            ResponseBlock::Other => {}
        }
    }

    Ok(LlmResponse {
        content: texts.join("\n"),
        tool_calls,
        finish_reason: resp.stop_reason.unwrap_or_else(|| "stop".to_string()),
        usage: usage::normalize(resp.usage),
    })
}

// ─────────────────────────────────────────────
// AnthropicProvider
// ─────────────────────────────────────────────

/// Direct client for the Anthropic Messages API.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    timeout: Duration,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http::build_client(REQUEST_TIMEOUT),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Point the client at a different base URL (proxy, mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
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
impl LlmProvider for AnthropicProvider {
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
        let (system, wire_messages) = to_wire_messages(messages);

        debug!(
            provider = DISPLAY_NAME,
            model,
            messages = wire_messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let request_body = MessagesRequest {
            model,
            max_tokens: config.max_tokens,
            messages: wire_messages,
            system,
            tools: tools.filter(|t| !t.is_empty()).map(to_wire_tools),
            temperature: config.temperature,
        };

        let request = self
            .client
            .post(http::endpoint(&self.api_base, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request_body);

        let body = http::send(DISPLAY_NAME, self.timeout, request).await?;
        let resp = parse_response(&body)?;

        debug!(
            provider = DISPLAY_NAME,
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
        DISPLAY_NAME
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
