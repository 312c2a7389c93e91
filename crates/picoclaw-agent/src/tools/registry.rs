//! Tool Registry — name-keyed store that dispatches LLM tool calls.
//!
//! Nothing a tool does escapes this boundary as a Rust error: failures and
//! panics both come back as `[ERROR] …` text.

use std::collections::HashMap;
use std::sync::Arc;

use picoclaw_core::types::ToolDefinition;
use serde_json::Value;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::base::Tool;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Why a tool call produced no regular output.
///
/// `Display` is the exact text fed back to the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("[ERROR] Tool not found: {0}")]
    NotFound(String),

    #[error("[ERROR] {message}")]
    Failed { tool: String, message: String },

    #[error("[ERROR] Tool execution failed: {tool} panicked: {message}")]
    Panicked { tool: String, message: String },
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across tasks.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if self.tools.contains_key(tool.name()) {
            warn!(tool = tool.name(), "replacing registered tool");
        } else {
            info!(tool = tool.name(), "registered tool");
        }
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// LLM-facing definitions for all registered tools, sorted by name.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// Prompt summaries for all registered tools, sorted by name.
    pub fn summaries(&self) -> Vec<String> {
        self.tool_names()
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.summary())
            .collect()
    }

    /// Run a tool, keeping success and failure apart.
    ///
    /// The tool future runs on its own task so a panic inside it is caught
    /// here instead of unwinding through the caller. The task is aborted if
    /// this future is dropped, so a cancelled turn stops its tool too.
    pub async fn try_execute(
        &self,
        name: &str,
        params: HashMap<String, Value>,
    ) -> Result<String, ToolError> {
        let tool = match self.tools.get(name) {
            Some(t) => Arc::clone(t),
            None => {
                warn!(tool = name, "tool not found");
                return Err(ToolError::NotFound(name.to_string()));
            }
        };

        debug!(tool = name, "executing tool");
        let mut task = AbortOnDrop(tokio::spawn(async move { tool.execute(params).await }));

        match (&mut task.0).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "tool execution failed");
                Err(ToolError::Failed {
                    tool: name.to_string(),
                    message: format!("{e:#}"),
                })
            }
            Err(join_err) => {
                let message = panic_message(join_err);
                warn!(tool = name, error = %message, "tool panicked");
                Err(ToolError::Panicked {
                    tool: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Execute a tool by name. Always returns text: the output, or the
    /// `[ERROR] …` rendering of whatever went wrong.
    pub async fn execute(&self, name: &str, params: HashMap<String, Value>) -> String {
        self.try_execute(name, params)
            .await
            .unwrap_or_else(|e| e.to_string())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string", "description": "Text to echo"}
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
            let text = params
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("(empty)");
            Ok(format!("Echo: {text}"))
        }
    }

    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("disk unplugged").context("Failed to read file"))
        }
    }

    struct PanicTool;

    #[async_trait]
    impl Tool for PanicTool {
        fn name(&self) -> &str {
            "boom"
        }
        fn description(&self) -> &str {
            "Panics"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            panic!("index out of bounds")
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert!(reg.get("echo").is_some());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_collision_last_wins() {
        struct LoudEcho;

        #[async_trait]
        impl Tool for LoudEcho {
            fn name(&self) -> &str {
                "echo"
            }
            fn description(&self) -> &str {
                "LOUD"
            }
            fn parameters(&self) -> Value {
                json!({"type": "object", "properties": {}})
            }
            async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
                Ok("ECHO".into())
            }
        }

        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        reg.register(Arc::new(LoudEcho));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_definitions()[0].function.description, "LOUD");
    }

    #[test]
    fn test_tool_names_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool));
        reg.register(Arc::new(EchoTool));
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
    }

    #[test]
    fn test_get_definitions() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        let defs = reg.get_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].function.name, "echo");
        assert_eq!(defs[0].tool_type, "function");
    }

    #[test]
    fn test_summaries() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool));
        reg.register(Arc::new(EchoTool));
        assert_eq!(
            reg.summaries(),
            vec!["### echo\nEchoes back the input\n", "### fail\nAlways fails\n"]
        );
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        let mut params = HashMap::new();
        params.insert("text".into(), json!("hello"));
        assert_eq!(reg.execute("echo", params).await, "Echo: hello");
    }

    #[tokio::test]
    async fn test_execute_not_found() {
        let reg = ToolRegistry::new();
        let result = reg.execute("missing", HashMap::new()).await;
        assert_eq!(result, "[ERROR] Tool not found: missing");
    }

    #[tokio::test]
    async fn test_execute_error_keeps_context_chain() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool));
        let result = reg.execute("fail", HashMap::new()).await;
        assert_eq!(result, "[ERROR] Failed to read file: disk unplugged");
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(PanicTool));

        let err = reg.try_execute("boom", HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::Panicked { .. }));

        let text = reg.execute("boom", HashMap::new()).await;
        assert!(text.starts_with("[ERROR] Tool execution failed: boom panicked"));
        assert!(text.contains("index out of bounds"));
    }

    /// Sleeps, then leaves a marker file behind.
    struct SlowWriteTool {
        marker: std::path::PathBuf,
    }

    #[async_trait]
    impl Tool for SlowWriteTool {
        fn name(&self) -> &str {
            "slow_write"
        }
        fn description(&self) -> &str {
            "Writes a marker after a delay"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            std::fs::write(&self.marker, "late")?;
            Ok("written".into())
        }
    }

    #[tokio::test]
    async fn test_dropped_call_aborts_tool() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(SlowWriteTool {
            marker: marker.clone(),
        }));

        let cancelled = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            reg.execute("slow_write", HashMap::new()),
        )
        .await;
        assert!(cancelled.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_completed_call_is_unaffected_by_guard() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(SlowWriteTool {
            marker: marker.clone(),
        }));

        assert_eq!(reg.execute("slow_write", HashMap::new()).await, "written");
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropped_shell_call_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(crate::tools::ShellTool::new(
            dir.path().to_path_buf(),
            Some(10),
            true,
        )));
        let params = HashMap::from([("command".to_string(), json!("sleep 1; touch marker"))]);

        let cancelled = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            reg.execute("shell", params),
        )
        .await;
        assert!(cancelled.is_err());

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert!(!dir.path().join("marker").exists());
    }
}
