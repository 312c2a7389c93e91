//! PicoClaw core — conversation types, provider errors, configuration, helpers.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::ProviderError;
pub use types::{FunctionDefinition, LlmResponse, Message, ToolCall, ToolDefinition, UsageInfo};
