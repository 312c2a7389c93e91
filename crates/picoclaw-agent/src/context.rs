//! Context builder — constructs the system prompt and conversation messages.
//!
//! The system prompt is rebuilt on every turn from the identity block, the
//! registry's tool summaries, optional bootstrap files in the workspace root,
//! and the tail of long-term memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use picoclaw_core::types::Message;
use tracing::debug;

use crate::memory::{MemoryStore, MEMORY_CONTEXT_CHARS};
use crate::tools::ToolRegistry;

// ─────────────────────────────────────────────
// Bootstrap / identity files
// ─────────────────────────────────────────────

/// Files that are injected into the system prompt, in this order, when
/// present in the workspace root.
pub const BOOTSTRAP_FILES: &[&str] = &["IDENTITY.md", "SOUL.md", "USER.md", "AGENTS.md"];

/// Host-supplied key/value context for a single turn.
///
/// Rendered as a `## Session Context` block at the end of that turn's system
/// message; never persisted.
pub type TurnContext = BTreeMap<String, String>;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

/// Builds system prompts and conversation message lists for the agent loop.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    /// Root workspace directory.
    workspace: PathBuf,
    memory: MemoryStore,
}

impl ContextBuilder {
    /// Create a context builder, making sure the workspace and its `memory/`
    /// directory exist.
    pub fn new(workspace: impl Into<PathBuf>) -> std::io::Result<Self> {
        let workspace = workspace.into();
        std::fs::create_dir_all(&workspace)?;
        let workspace = workspace.canonicalize().unwrap_or(workspace);
        let memory = MemoryStore::new(&workspace)?;
        Ok(Self { workspace, memory })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    // ────────────── System prompt ──────────────

    /// Build the full system prompt as of now.
    pub fn build_system_prompt(&self, tools: &ToolRegistry) -> String {
        self.build_system_prompt_at(Local::now(), tools)
    }

    /// Build the full system prompt with an explicit clock reading.
    pub fn build_system_prompt_at(&self, now: DateTime<Local>, tools: &ToolRegistry) -> String {
        let mut parts: Vec<String> = Vec::new();

        // 1) Identity
        parts.push(self.build_identity(now));

        // 2) Tool summaries
        if let Some(section) = build_tools_section(tools) {
            parts.push(section);
        }

        // 3) Bootstrap files
        for filename in BOOTSTRAP_FILES {
            let path = self.workspace.join(filename);
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(file = filename, "loaded bootstrap file");
                    parts.push(format!("## {filename}\n\n{content}"));
                }
                Err(e) => debug!(file = filename, error = %e, "skipping unreadable bootstrap file"),
            }
        }

        // 4) Memory tail
        if let Some(memory) = self.memory.recent(MEMORY_CONTEXT_CHARS) {
            parts.push(format!("## Recent Memory\n\n{memory}"));
        }

        parts.join(SECTION_SEPARATOR)
    }

    /// Core identity block.
    fn build_identity(&self, now: DateTime<Local>) -> String {
        let now = now.format("%Y-%m-%d %H:%M (%A)");
        let os = std::env::consts::OS;
        let arch = std::env::consts::ARCH;
        let workspace = self.workspace.display();
        let memory_file = self.memory.memory_file().display();

        format!(
            "# picoclaw 🦞\n\n\
             You are picoclaw, a helpful AI assistant.\n\n\
             ## Current Time\n{now}\n\n\
             ## Runtime\nRust on {os}/{arch}\n\n\
             ## Workspace\n\
             Your workspace is at: {workspace}\n\
             - Memory: {memory_file}\n\n\
             ## Important Rules\n\n\
             1. **ALWAYS use tools** - When you need to perform an action (execute commands, \
             read/write files, search the web), you MUST call the appropriate tool. \
             Do NOT just say you'll do it or pretend to do it.\n\n\
             2. **Be helpful and accurate** - When using tools, briefly explain what you're doing.\n\n\
             3. **Memory** - When remembering something important, use the memory tool to write to {memory_file}\n\n\
             4. **Security** - You operate in a sandboxed environment. Dangerous commands are blocked."
        )
    }

    // ────────────── Message building ──────────────

    /// Build the initial message list for a turn.
    ///
    /// 1. System prompt (plus the turn context, if any)
    /// 2. History, unchanged
    /// 3. Current user message
    pub fn build_messages(
        &self,
        tools: &ToolRegistry,
        history: &[Message],
        user_text: &str,
        turn_context: Option<&TurnContext>,
    ) -> Vec<Message> {
        let mut system = self.build_system_prompt(tools);
        if let Some(section) = turn_context.and_then(render_turn_context) {
            system.push_str(SECTION_SEPARATOR);
            system.push_str(&section);
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system));
        messages.extend_from_slice(history);
        messages.push(Message::user(user_text));
        messages
    }
}

fn build_tools_section(tools: &ToolRegistry) -> Option<String> {
    let summaries = tools.summaries();
    if summaries.is_empty() {
        return None;
    }
    Some(format!(
        "## Available Tools\n\n\
         **CRITICAL**: You MUST use tools to perform actions. \
         Do NOT pretend to execute commands or operations.\n\n\
         You have access to the following tools:\n\n{}",
        summaries.join("\n")
    ))
}

fn render_turn_context(ctx: &TurnContext) -> Option<String> {
    if ctx.is_empty() {
        return None;
    }
    let lines: Vec<String> = ctx.iter().map(|(k, v)| format!("- {k}: {v}")).collect();
    Some(format!("## Session Context\n\n{}", lines.join("\n")))
}
