//! `picoclaw status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use picoclaw_core::config::{get_config_path, load_config, Config};
use picoclaw_providers::PROVIDERS;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🦞 PicoClaw Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        presence(config_path.exists())
    );

    let workspace = config.workspace_path();
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        workspace.display(),
        presence(workspace.exists())
    );

    let defaults = &config.agents.defaults;
    println!("  {:<18} {}", "Default provider:".bold(), defaults.provider);
    println!("  {:<18} {}", "Model:".bold(), model_label(&config));
    println!(
        "  {:<18} {}",
        "Parameters:".bold(),
        format!(
            "max_tokens: {} | max_iterations: {} | temperature: {}",
            defaults.max_tokens,
            defaults.max_tool_iterations,
            defaults
                .temperature
                .map_or_else(|| "default".to_string(), |t| t.to_string())
        )
        .dimmed()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let configured = config
            .providers
            .get_by_name(spec.name)
            .is_some_and(|p| p.is_configured());
        println!("    {:<20} {}", spec.display_name, key_status(configured));
    }

    println!();
    println!(
        "  {:<18} {}",
        "Web search:".bold(),
        key_status(!config.tools.web.search.api_key.is_empty())
    );
    println!(
        "  {:<18} {}",
        "Shell:".bold(),
        format!(
            "timeout {}s | sandbox {}",
            config.tools.exec.timeout,
            if config.tools.exec.sandbox { "on" } else { "off" }
        )
        .dimmed()
    );

    println!();

    Ok(())
}

fn model_label(config: &Config) -> String {
    let model = &config.agents.defaults.model;
    if model.is_empty() {
        "(provider default)".to_string()
    } else {
        model.clone()
    }
}

fn presence(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn key_status(configured: bool) -> String {
    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        "· not configured".dimmed().to_string()
    }
}
