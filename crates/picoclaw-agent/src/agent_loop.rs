//! Agent loop — the bounded converse-then-act cycle.
//!
//! One call to [`AgentLoop::chat`] is one conversation turn:
//! 1. Build the message list (system prompt, history, user message)
//! 2. Call the LLM with the registry's tool definitions
//! 3. Execute any tool calls in order, feed results back, repeat
//! 4. Stop when the model answers without tool calls or the iteration cap is hit

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use picoclaw_core::config::Config;
use picoclaw_core::error::ProviderError;
use picoclaw_core::types::{Message, UsageInfo};
use picoclaw_providers::{LlmProvider, LlmRequestConfig};

use crate::context::{ContextBuilder, TurnContext};
use crate::tools::{default_tools, ToolRegistry};

/// Default maximum model round trips per turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

// ─────────────────────────────────────────────
// Turn result
// ─────────────────────────────────────────────

/// What happened to one tool call.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutcome {
    Result(String),
    Error(String),
}

/// One entry of the execution log: `{tool, args, result}` or `{tool, args, error}`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ToolExecution {
    pub tool: String,
    pub args: HashMap<String, Value>,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

/// Result of one conversation turn.
#[derive(Clone, Debug, Serialize)]
pub struct AgentRunResult {
    /// Last non-empty assistant text seen (empty if the model never produced any).
    pub content: String,
    /// Token usage summed over every model round trip.
    pub usage: UsageInfo,
    /// Number of model round trips performed.
    pub iterations: usize,
    /// Tool executions, in execution order.
    pub tool_log: Vec<ToolExecution>,
    /// The full transcript, starting with the system message.
    pub messages: Vec<Message>,
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Composes a provider, the tool registry, and the context builder.
///
/// Holds no per-turn state, so one instance can serve concurrent turns.
pub struct AgentLoop {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    context: ContextBuilder,
    /// Model identifier sent with every request.
    model: String,
    request_config: LlmRequestConfig,
    max_iterations: usize,
}

impl AgentLoop {
    /// Create an agent loop.
    ///
    /// `model` falls back to the provider's default when `None` or empty.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        context: ContextBuilder,
        model: Option<String>,
        max_iterations: Option<usize>,
    ) -> Self {
        let model = model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let max_iterations = max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);

        info!(
            provider = provider.display_name(),
            model = %model,
            tools = tools.len(),
            max_iterations,
            "agent loop initialized"
        );

        Self {
            provider,
            tools,
            context,
            model,
            request_config: LlmRequestConfig::default(),
            max_iterations,
        }
    }

    /// Build an agent over the configured workspace with the default tool set.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &Config) -> std::io::Result<Self> {
        let defaults = &config.agents.defaults;
        let context = ContextBuilder::new(config.workspace_path())?;
        let tools = default_tools(context.workspace(), &config.tools);
        let max_iterations = usize::try_from(defaults.max_tool_iterations).unwrap_or(DEFAULT_MAX_ITERATIONS);

        Ok(Self::new(
            provider,
            tools,
            context,
            Some(defaults.model.clone()),
            Some(max_iterations),
        )
        .with_request_config(LlmRequestConfig {
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }))
    }

    /// Override max_tokens / temperature (builder pattern).
    pub fn with_request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    /// Run one conversation turn.
    ///
    /// # Errors
    /// A failed model round trip ends the turn with its [`ProviderError`].
    /// Tool failures never do; they are fed back to the model as text.
    pub async fn chat(
        &self,
        user_message: &str,
        history: &[Message],
        turn_context: Option<&TurnContext>,
    ) -> Result<AgentRunResult, ProviderError> {
        let mut messages =
            self.context
                .build_messages(&self.tools, history, user_message, turn_context);
        let tool_defs = self.tools.get_definitions();

        let mut content = String::new();
        let mut usage = UsageInfo::default();
        let mut tool_log = Vec::new();
        let mut iterations = 0;
        let mut finished = false;

        while iterations < self.max_iterations {
            iterations += 1;
            debug!(iteration = iterations, messages = messages.len(), "LLM call");

            let response = self
                .provider
                .chat(&messages, Some(&tool_defs), &self.model, &self.request_config)
                .await?;

            usage += response.usage;
            if !response.content.is_empty() {
                content.clone_from(&response.content);
            }

            if !response.has_tool_calls() {
                messages.push(Message::assistant(response.content));
                finished = true;
                break;
            }

            messages.push(Message::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for call in response.tool_calls {
                info!(tool = %call.name, iteration = iterations, "executing tool call");

                let outcome = match self.tools.try_execute(&call.name, call.arguments.clone()).await {
                    Ok(output) => ToolOutcome::Result(output),
                    Err(e) => ToolOutcome::Error(e.to_string()),
                };
                let text = match &outcome {
                    ToolOutcome::Result(s) | ToolOutcome::Error(s) => s.clone(),
                };
                debug!(tool = %call.name, result_len = text.len(), "tool result");

                messages.push(Message::tool_result(call.id, text));
                tool_log.push(ToolExecution {
                    tool: call.name,
                    args: call.arguments,
                    outcome,
                });
            }
        }

        if !finished {
            warn!(
                max_iterations = self.max_iterations,
                tool_calls = tool_log.len(),
                "max tool iterations reached"
            );
        }

        info!(
            iterations,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "turn complete"
        );

        Ok(AgentRunResult {
            content,
            usage,
            iterations,
            tool_log,
            messages,
        })
    }

    /// Run a single tool directly, outside any conversation.
    pub async fn execute_tool(&self, name: &str, params: HashMap<String, Value>) -> String {
        self.tools.execute(name, params).await
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    /// The model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
