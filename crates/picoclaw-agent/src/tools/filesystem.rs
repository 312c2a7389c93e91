//! Filesystem tools — read, write, list directory.
//!
//! Every path is resolved against the workspace root and must stay inside
//! it. Containment is checked before the filesystem is touched.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::base::{optional_string, require_string, Tool};

// ─────────────────────────────────────────────
// Shared path helper
// ─────────────────────────────────────────────

/// Resolve `path` against `workspace`, refusing anything that lands outside.
///
/// Components are walked one at a time and the prefix is canonicalized after
/// every step, so `..` and symlinks are followed the way the OS would follow
/// them. A prefix that does not exist stays lexical, but a later `..` can
/// bring the walk back onto disk, so canonicalization is retried each time.
pub(crate) fn resolve_in_workspace(workspace: &Path, path: &str) -> anyhow::Result<PathBuf> {
    let root = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());

    let mut resolved = root.clone();

    for component in Path::new(path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                resolved = PathBuf::from(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = resolved.canonicalize() {
                    resolved = real;
                }
            }
        }
    }

    if !resolved.starts_with(&root) {
        warn!(path, workspace = %root.display(), "path outside workspace denied");
        anyhow::bail!("Access denied: path outside workspace");
    }

    Ok(resolved)
}

// ─────────────────────────────────────────────
// ReadFileTool
// ─────────────────────────────────────────────

/// Reads and returns the entire content of a file.
pub struct ReadFileTool {
    workspace: PathBuf,
}

impl ReadFileTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read contents of a file in the workspace. Provide the relative path from workspace root."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative path to the file from workspace root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path_str = require_string(&params, "path")?;
        let path = resolve_in_workspace(&self.workspace, &path_str)?;

        if !path.exists() {
            anyhow::bail!("File not found: {path_str}");
        }
        if !path.is_file() {
            anyhow::bail!("Not a file: {path_str}");
        }

        tokio::fs::read_to_string(&path)
            .await
            .context("Failed to read file")
    }
}

// ─────────────────────────────────────────────
// WriteFileTool
// ─────────────────────────────────────────────

/// Creates or overwrites a file with the given content.
pub struct WriteFileTool {
    workspace: PathBuf,
}

impl WriteFileTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write or overwrite a file with the given content. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative path to the file from workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path_str = require_string(&params, "path")?;
        let content = require_string(&params, "content")?;
        let path = resolve_in_workspace(&self.workspace, &path_str)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to write file")?;
        }

        tokio::fs::write(&path, &content)
            .await
            .context("Failed to write file")?;
        Ok(format!(
            "[SUCCESS] File written: {path_str} ({} bytes)",
            content.len()
        ))
    }
}

// ─────────────────────────────────────────────
// ListFilesTool
// ─────────────────────────────────────────────

/// Lists directory entries with type and size columns.
pub struct ListFilesTool {
    workspace: PathBuf,
}

impl ListFilesTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories in the workspace. Provide a relative path or leave empty for root."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative path from workspace root (default: root)",
                    "default": "."
                }
            }
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path_str = optional_string(&params, "path")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let dir = resolve_in_workspace(&self.workspace, &path_str)?;

        if !dir.exists() {
            anyhow::bail!("Directory not found: {path_str}");
        }
        if !dir.is_dir() {
            anyhow::bail!("Not a directory: {path_str}");
        }

        let mut entries: Vec<(String, bool, u64)> = Vec::new();
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .context("Failed to list directory")?;
        while let Some(entry) = reader
            .next_entry()
            .await
            .context("Failed to list directory")?
        {
            // Follow symlinks; a dangling link is listed as itself.
            let meta = match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(_) => entry.metadata().await.context("Failed to list directory")?,
            };
            entries.push((
                entry.file_name().to_string_lossy().into_owned(),
                meta.is_dir(),
                meta.len(),
            ));
        }

        if entries.is_empty() {
            return Ok("[Directory is empty]".to_string());
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let lines: Vec<String> = entries
            .into_iter()
            .map(|(name, is_dir, size)| {
                if is_dir {
                    format!("{:<4} {:>10} {}", "DIR", "-", name)
                } else {
                    format!("{:<4} {:>10} {}", "FILE", size, name)
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
