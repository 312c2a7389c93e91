//! LLM Provider trait — the seam every vendor backend sits behind.
//!
//! Anthropic, OpenAI, and OpenRouter each implement this trait; the agent loop
//! only ever talks to `dyn LlmProvider`.

use async_trait::async_trait;
use picoclaw_core::error::ProviderError;
use picoclaw_core::types::{LlmResponse, Message, ToolDefinition};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature. Omitted from the request when `None`.
    pub temperature: Option<f64>,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat turn.
    ///
    /// # Arguments
    /// * `messages` — Conversation in the internal message model.
    /// * `tools`    — Tool definitions the model may call.
    /// * `model`    — Model identifier; empty selects [`LlmProvider::default_model`].
    /// * `config`   — max_tokens, temperature.
    ///
    /// # Errors
    /// Any non-success status, unparseable body, transport failure, or timeout
    /// is a [`ProviderError`]. A failed call never yields empty content.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
