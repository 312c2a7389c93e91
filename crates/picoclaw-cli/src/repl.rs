//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent input history.
//! The conversation itself lives only in memory for the session.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use picoclaw_agent::{AgentLoop, AgentRunResult};
use picoclaw_core::types::Message;
use picoclaw_core::utils::get_data_path;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop.
pub async fn run(agent: AgentLoop) -> Result<()> {
    helpers::print_banner(agent.model());

    let mut editor = create_editor()?;
    let mut history: Vec<Message> = Vec::new();

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(input = trimmed, history = history.len(), "processing input");
        helpers::print_thinking();

        match agent.chat(trimmed, &history, None).await {
            Ok(result) => {
                helpers::clear_thinking();
                helpers::print_result(&result);
                history = next_history(result);
            }
            Err(e) => {
                helpers::clear_thinking();
                eprintln!("\n❌ Error: {e}\n");
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// The transcript minus its system message, which is rebuilt every turn.
fn next_history(result: AgentRunResult) -> Vec<Message> {
    result
        .messages
        .into_iter()
        .filter(|m| !matches!(m, Message::System { .. }))
        .collect()
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!(path = %history_path.display(), "loaded REPL history");
    }

    Ok(editor)
}

/// Save input history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!(error = %e, "failed to save history");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use picoclaw_core::types::UsageInfo;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".picoclaw"));
        assert!(path.ends_with("history/cli_history"));
    }

    #[test]
    fn next_history_drops_system_message() {
        let result = AgentRunResult {
            content: "hello".into(),
            usage: UsageInfo::default(),
            iterations: 1,
            tool_log: Vec::new(),
            messages: vec![
                Message::system("prompt"),
                Message::user("hi"),
                Message::assistant("hello"),
            ],
        };
        assert_eq!(
            next_history(result),
            vec![Message::user("hi"), Message::assistant("hello")]
        );
    }
}
