//! LLM provider layer for PicoClaw.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`anthropic::AnthropicProvider`] — system-out-of-band wire style
//! - [`openai::OpenAiProvider`] — inline-message wire style
//! - [`openrouter::OpenRouterProvider`] — OpenAI-compatible reseller
//! - [`registry`] — static specs, `create_provider`, `ProviderRegistry`

pub mod anthropic;
mod http;
pub mod openai;
pub mod openrouter;
pub mod registry;
pub mod traits;
mod usage;

pub use anthropic::AnthropicProvider;
pub use http::REQUEST_TIMEOUT;
pub use openai::OpenAiProvider;
pub use openrouter::OpenRouterProvider;
pub use registry::{create_provider, ProviderRegistry, ProviderSpec, WireStyle, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
