//! Tool modules for the PicoClaw agent.

pub mod base;
pub mod filesystem;
pub mod memory;
pub mod registry;
pub mod shell;
pub mod web;

use std::path::Path;
use std::sync::Arc;

use picoclaw_core::config::schema::ToolsConfig;

pub use base::{optional_string, optional_u64, require_string, Tool};
pub use filesystem::{ListFilesTool, ReadFileTool, WriteFileTool};
pub use memory::MemoryTool;
pub use registry::{ToolError, ToolRegistry};
pub use shell::ShellTool;
pub use web::WebSearchTool;

/// Build the standard tool set for a workspace.
///
/// `web_search` is only registered when a search API key is configured.
pub fn default_tools(workspace: &Path, config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let ws = workspace.to_path_buf();

    registry.register(Arc::new(ShellTool::new(
        ws.clone(),
        Some(config.exec.timeout),
        config.exec.sandbox,
    )));
    registry.register(Arc::new(ReadFileTool::new(ws.clone())));
    registry.register(Arc::new(WriteFileTool::new(ws.clone())));
    registry.register(Arc::new(ListFilesTool::new(ws)));
    registry.register(Arc::new(MemoryTool::new(workspace)));

    let search = &config.web.search;
    if !search.api_key.is_empty() {
        registry.register(Arc::new(WebSearchTool::new(
            search.api_key.clone(),
            search.max_results,
        )));
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tools_without_search_key() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_tools(dir.path(), &ToolsConfig::default());
        assert_eq!(
            registry.tool_names(),
            vec!["list_files", "memory", "read_file", "shell", "write_file"]
        );
    }

    #[test]
    fn test_default_tools_with_search_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ToolsConfig::default();
        config.web.search.api_key = "brave".into();
        let registry = default_tools(dir.path(), &config);
        assert!(registry.has("web_search"));
        assert_eq!(registry.len(), 6);
    }
}
