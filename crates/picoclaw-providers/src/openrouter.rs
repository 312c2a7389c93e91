//! OpenRouter reseller provider.
//!
//! Wire-compatible with OpenAI; differs only in endpoint, attribution
//! headers, and default model.

use std::time::Duration;

use async_trait::async_trait;
use picoclaw_core::error::ProviderError;
use picoclaw_core::types::{LlmResponse, Message, ToolDefinition};

use crate::openai::OpenAiProvider;
use crate::traits::{LlmProvider, LlmRequestConfig};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// OpenRouter client: an [`OpenAiProvider`] with OpenRouter defaults.
#[derive(Debug)]
pub struct OpenRouterProvider {
    inner: OpenAiProvider,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: OpenAiProvider::new(api_key)
                .with_api_base(DEFAULT_API_BASE)
                .with_default_model(DEFAULT_MODEL)
                .with_display_name("OpenRouter")
                .with_header("X-Title", "PicoClaw"),
        }
    }

    pub fn with_api_base(self, api_base: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_api_base(api_base),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    pub fn api_base(&self) -> &str {
        self.inner.api_base()
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.inner.chat(messages, tools, model, config).await
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }

    fn display_name(&self) -> &str {
        self.inner.display_name()
    }
}
