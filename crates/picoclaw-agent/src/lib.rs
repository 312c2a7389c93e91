//! PicoClaw Agent — core loop, tools, context builder, and memory.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and the built-in tools (shell, files, memory, web search)
//! - **memory**: The workspace's long-term memory file
//! - **context**: System prompt and message list construction
//! - **agent_loop**: The LLM ↔ tool-calling main loop

pub mod agent_loop;
pub mod context;
pub mod memory;
pub mod tools;

pub use agent_loop::{AgentLoop, AgentRunResult, ToolExecution, ToolOutcome};
pub use context::{ContextBuilder, TurnContext};
pub use memory::MemoryStore;
pub use tools::{default_tools, Tool, ToolError, ToolRegistry};
