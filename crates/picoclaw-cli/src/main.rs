//! PicoClaw CLI — entry point.
//!
//! A thin host around the agent core: it loads config, builds the provider
//! registry and tool set, and runs conversation turns.
//!
//! # Commands
//!
//! - `picoclaw agent [-m MESSAGE] [--provider P] [--model M]` — chat (single-shot or REPL)
//! - `picoclaw tool <NAME> [--args JSON]` — run one tool directly
//! - `picoclaw status` — show configuration and provider status

mod helpers;
mod repl;
mod status;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use picoclaw_agent::{default_tools, AgentLoop, ContextBuilder};
use picoclaw_core::config::{load_config, Config};
use picoclaw_providers::{LlmProvider, ProviderRegistry};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🦞 PicoClaw — a small tool-using AI agent
#[derive(Parser)]
#[command(name = "picoclaw", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Provider to use instead of the configured default
        #[arg(long)]
        provider: Option<String>,

        /// Model to use instead of the configured one
        #[arg(long)]
        model: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run a single tool directly, without a model
    Tool {
        /// Tool name (e.g. `list_files`)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Agent {
            message,
            provider,
            model,
            logs,
        } => {
            init_logging(logs);
            run_agent(message, provider, model).await
        }
        Commands::Tool { name, args, logs } => {
            init_logging(logs);
            run_tool(&name, &args).await
        }
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(
    message: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let mut config = load_config(None);
    if let Some(model) = model {
        config.agents.defaults.model = model;
    }
    let agent = build_agent_loop(&config, provider.as_deref())?;

    match message {
        Some(msg) => {
            info!(model = agent.model(), "processing single message");
            let result = agent
                .chat(&msg, &[], None)
                .await
                .context("agent turn failed")?;
            helpers::print_result(&result);
        }
        None => repl::run(agent).await?,
    }

    Ok(())
}

/// Build an `AgentLoop` from the loaded configuration.
fn build_agent_loop(config: &Config, provider_name: Option<&str>) -> Result<AgentLoop> {
    let provider = select_provider(config, provider_name)?;
    AgentLoop::from_config(provider, config).with_context(|| {
        format!(
            "failed to prepare workspace: {}",
            config.workspace_path().display()
        )
    })
}

fn select_provider(config: &Config, name: Option<&str>) -> Result<Arc<dyn LlmProvider>> {
    let registry = ProviderRegistry::from_config(&config.providers, &config.agents.defaults.provider);
    if registry.is_empty() {
        anyhow::bail!(
            "No LLM provider configured. Set ANTHROPIC_API_KEY, OPENAI_API_KEY or \
             OPENROUTER_API_KEY, or add an apiKey to ~/.picoclaw/config.json"
        );
    }
    registry.get(name).map_err(anyhow::Error::from)
}

// ─────────────────────────────────────────────
// Tool command
// ─────────────────────────────────────────────

async fn run_tool(name: &str, args: &str) -> Result<()> {
    let config = load_config(None);
    let params = parse_tool_args(args)?;

    let context = ContextBuilder::new(config.workspace_path()).with_context(|| {
        format!(
            "failed to prepare workspace: {}",
            config.workspace_path().display()
        )
    })?;
    let tools = default_tools(context.workspace(), &config.tools);

    let output = tools.execute(name, params).await;
    println!("{output}");
    Ok(())
}

fn parse_tool_args(args: &str) -> Result<HashMap<String, Value>> {
    serde_json::from_str(args).context("--args must be a JSON object")
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("picoclaw=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use picoclaw_core::config::schema::ProviderConfig;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_agent_flags() {
        let cli = Cli::parse_from([
            "picoclaw", "agent", "-m", "hi", "--provider", "openai", "--model", "gpt-4o-mini",
        ]);
        match cli.command {
            Commands::Agent {
                message,
                provider,
                model,
                logs,
            } => {
                assert_eq!(message.as_deref(), Some("hi"));
                assert_eq!(provider.as_deref(), Some("openai"));
                assert_eq!(model.as_deref(), Some("gpt-4o-mini"));
                assert!(!logs);
            }
            _ => panic!("expected agent command"),
        }
    }

    #[test]
    fn parses_tool_command() {
        let cli = Cli::parse_from(["picoclaw", "tool", "list_files", "--args", r#"{"path":"."}"#]);
        match cli.command {
            Commands::Tool { name, args, .. } => {
                assert_eq!(name, "list_files");
                assert_eq!(parse_tool_args(&args).unwrap()["path"], ".");
            }
            _ => panic!("expected tool command"),
        }
    }

    #[test]
    fn tool_args_must_be_object() {
        assert!(parse_tool_args("{}").unwrap().is_empty());
        assert!(parse_tool_args("[1, 2]").is_err());
        assert!(parse_tool_args("not json").is_err());
    }

    #[test]
    fn select_provider_without_keys_fails() {
        let config = Config::default();
        let err = select_provider(&config, None).err().unwrap();
        assert!(err.to_string().contains("No LLM provider configured"));
    }

    #[test]
    fn select_provider_honours_flag() {
        let mut config = Config::default();
        config.providers.anthropic = ProviderConfig {
            api_key: "sk-ant".into(),
            api_base: None,
        };
        config.providers.openai = ProviderConfig {
            api_key: "sk-oa".into(),
            api_base: None,
        };

        assert_eq!(select_provider(&config, None).unwrap().display_name(), "Anthropic");
        assert_eq!(
            select_provider(&config, Some("openai")).unwrap().display_name(),
            "OpenAI"
        );
        assert!(select_provider(&config, Some("openrouter")).is_err());
    }
}
