//! Shared CLI helpers — result printing, banner, thinking indicator.

use colored::Colorize;

use picoclaw_agent::{AgentRunResult, ToolExecution, ToolOutcome};
use picoclaw_core::types::UsageInfo;

/// Print the outcome of one turn: the reply, then a dimmed summary line.
pub fn print_result(result: &AgentRunResult) {
    println!();
    println!("{}", "🦞 PicoClaw".cyan().bold());
    if result.content.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", result.content);
    }
    for entry in &result.tool_log {
        println!("{}", format_tool_entry(entry).dimmed());
    }
    println!("{}", format_summary(result.iterations, &result.usage).dimmed());
    println!();
}

/// `iterations: 2 | tokens: 22 in / 8 out / 30 total`
pub fn format_summary(iterations: usize, usage: &UsageInfo) -> String {
    format!(
        "iterations: {iterations} | tokens: {} in / {} out / {} total",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

/// One line per tool execution: `  ✓ shell` or `  ✗ read_file`.
pub fn format_tool_entry(entry: &ToolExecution) -> String {
    let mark = match entry.outcome {
        ToolOutcome::Result(_) => "✓",
        ToolOutcome::Error(_) => "✗",
    };
    format!("  {mark} {}", entry.tool)
}

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "🦞 PicoClaw".cyan().bold(),
        version.dimmed(),
        model.dimmed()
    );
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
