//! Shell tool — execute commands in a subprocess inside the workspace.
//!
//! With sandbox mode on, a fixed denylist of dangerous substrings is checked
//! before anything is spawned.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::{info, warn};

use picoclaw_core::utils::truncate_output;

use super::base::{require_string, Tool};

/// Maximum output length before truncation (characters).
const MAX_OUTPUT_LEN: usize = 10_000;

/// Default command timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Substrings that are refused in sandbox mode (matched on the lowercased command).
pub const DENY_PATTERNS: &[&str] = &[
    "rm -rf",
    "format",
    "shutdown",
    "reboot",
    "dd if=",
    "mkfs",
    ":(){ :|:& };:",
    "fork()",
    "> /dev/sda",
];

// ─────────────────────────────────────────────
// ShellTool
// ─────────────────────────────────────────────

/// Execute shell commands with the workspace as working directory.
pub struct ShellTool {
    working_dir: PathBuf,
    timeout: Duration,
    sandbox: bool,
}

impl ShellTool {
    pub fn new(working_dir: PathBuf, timeout_secs: Option<u64>, sandbox: bool) -> Self {
        Self {
            working_dir,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            sandbox,
        }
    }

    /// The denylist entry a command trips, if any.
    fn blocked_pattern(&self, command: &str) -> Option<&'static str> {
        if !self.sandbox {
            return None;
        }
        let lower = command.to_lowercase();
        DENY_PATTERNS.iter().copied().find(|p| lower.contains(p))
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute shell commands. Use for system operations, running scripts, and automation tasks."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let command = require_string(&params, "command")?;

        if let Some(pattern) = self.blocked_pattern(&command) {
            warn!(command = %command, pattern, "dangerous command blocked");
            anyhow::bail!("Dangerous command blocked: {pattern}");
        }

        info!(command = %command, cwd = %self.working_dir.display(), "executing shell command");

        let (shell, flag) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let child = Command::new(shell)
            .args([flag, command.as_str()])
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to execute command: {e}"))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| anyhow::anyhow!("Failed to execute command: {e}"))?,
            Err(_) => {
                warn!(command = %command, "shell command timed out");
                anyhow::bail!(
                    "Command timed out after {} seconds",
                    self.timeout.as_secs()
                );
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            combined.push_str("\n[STDERR]\n");
            combined.push_str(&stderr);
        }
        let code = output.status.code().unwrap_or(-1);
        if code != 0 {
            combined.push_str(&format!("\n[EXIT CODE: {code}]"));
        }

        if combined.is_empty() {
            return Ok("[Command executed successfully with no output]".to_string());
        }
        Ok(truncate_output(&combined, MAX_OUTPUT_LEN))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_params(command: &str) -> HashMap<String, Value> {
        HashMap::from([("command".to_string(), Value::String(command.to_string()))])
    }

    fn tool(dir: &tempfile::TempDir, timeout: u64) -> ShellTool {
        ShellTool::new(dir.path().to_path_buf(), Some(timeout), true)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_runs_in_workspace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let result = tool(&dir, 10)
            .execute(make_params("echo hello && ls"))
            .await
            .unwrap();
        assert!(result.starts_with("hello\n"));
        assert!(result.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_and_exit_code_markers() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(&dir, 10)
            .execute(make_params("echo out; echo err 1>&2; exit 3"))
            .await
            .unwrap();
        assert_eq!(result, "out\n\n[STDERR]\nerr\n\n[EXIT CODE: 3]");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(&dir, 10).execute(make_params("true")).await.unwrap();
        assert_eq!(result, "[Command executed successfully with no output]");
    }

    #[tokio::test]
    async fn test_rm_rf_blocked_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x");
        std::fs::create_dir(&target).unwrap();

        let err = tool(&dir, 10)
            .execute(make_params(&format!("rm -rf {}", target.display())))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Dangerous command blocked: rm -rf");
        assert!(target.exists());
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(&dir, 10);
        assert_eq!(t.blocked_pattern("sudo SHUTDOWN -h now"), Some("shutdown"));
        assert_eq!(t.blocked_pattern(":(){ :|:& };:"), Some(":(){ :|:& };:"));
        assert_eq!(t.blocked_pattern("echo x > /dev/sda"), Some("> /dev/sda"));
        assert_eq!(t.blocked_pattern("ls -la"), None);
        assert_eq!(t.blocked_pattern("cat notes.txt"), None);
    }

    #[test]
    fn test_sandbox_off_allows_everything() {
        let t = ShellTool::new(PathBuf::from("."), None, false);
        assert_eq!(t.blocked_pattern("rm -rf /tmp/x"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(&dir, 1)
            .execute(make_params("sleep 30"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Command timed out after 1 seconds");
    }

    #[tokio::test]
    async fn test_missing_workspace_is_launch_failure() {
        let t = ShellTool::new(PathBuf::from("/nonexistent/picoclaw/ws"), Some(5), true);
        let err = t.execute(make_params("echo hi")).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to execute command:"));
    }

    #[test]
    fn test_tool_definition() {
        let t = ShellTool::new(PathBuf::from("/tmp"), None, true);
        let def = t.to_definition();
        assert_eq!(def.function.name, "shell");
        assert_eq!(def.function.parameters["required"][0], "command");
    }
}
