//! Memory store — the agent's long-term memory file.
//!
//! Memory lives in `workspace/memory/MEMORY.md`. The memory tool appends
//! timestamped entries to it; the context builder injects its tail into every
//! system prompt.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use picoclaw_core::utils::{local_timestamp, tail_chars};

/// Characters of memory injected into the system prompt.
pub const MEMORY_CONTEXT_CHARS: usize = 2000;

// ─────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────

/// File-based memory store for the agent.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    /// The `memory/` directory inside the workspace.
    memory_dir: PathBuf,
    /// Path to the long-term memory file.
    memory_file: PathBuf,
}

impl MemoryStore {
    /// Create a new memory store, creating the `memory/` directory if needed.
    pub fn new(workspace: &Path) -> std::io::Result<Self> {
        let store = Self::new_lazy(workspace);
        store.ensure_dir()?;
        Ok(store)
    }

    /// Create a MemoryStore without touching the filesystem.
    pub fn new_lazy(workspace: &Path) -> Self {
        let memory_dir = workspace.join("memory");
        let memory_file = memory_dir.join("MEMORY.md");
        Self {
            memory_dir,
            memory_file,
        }
    }

    /// Full memory content, or `None` if the file does not exist yet.
    pub fn read(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.memory_file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Append a timestamped entry.
    ///
    /// Entry format: `\n\n---\n[YYYY-MM-DD HH:MM:SS]\n<content>\n`.
    pub fn append(&self, content: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.memory_file)?;
        write!(file, "\n\n---\n[{}]\n{}\n", local_timestamp(), content)?;
        debug!(file = %self.memory_file.display(), bytes = content.len(), "memory appended");
        Ok(())
    }

    /// The trailing window of memory for the system prompt.
    ///
    /// Returns `None` if there is no memory (missing, unreadable, or blank).
    pub fn recent(&self, max_chars: usize) -> Option<String> {
        let content = self.read().ok().flatten()?;
        if content.trim().is_empty() {
            return None;
        }
        Some(tail_chars(&content, max_chars))
    }

    /// Path to the memory directory.
    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    /// Path to the long-term memory file.
    pub fn memory_file(&self) -> &Path {
        &self.memory_file
    }

    /// Ensure the memory directory exists.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        if !self.memory_dir.exists() {
            std::fs::create_dir_all(&self.memory_dir)?;
            debug!(dir = %self.memory_dir.display(), "created memory directory");
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
