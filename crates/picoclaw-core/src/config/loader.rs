//! Config loader — reads `~/.picoclaw/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.picoclaw/config.json`
//! 3. Environment variables `PICOCLAW_<SECTION>__<FIELD>` (override JSON)
//! 4. Vendor env vars (`ANTHROPIC_API_KEY`, …) for keys that are still empty

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `PICOCLAW_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `PICOCLAW_AGENTS__DEFAULTS__WORKSPACE`
/// - `PICOCLAW_AGENTS__DEFAULTS__PROVIDER`
/// - `PICOCLAW_AGENTS__DEFAULTS__MODEL`
/// - `PICOCLAW_AGENTS__DEFAULTS__MAX_TOKENS`
/// - `PICOCLAW_AGENTS__DEFAULTS__MAX_TOOL_ITERATIONS`
/// - `PICOCLAW_PROVIDERS__<NAME>__API_KEY` / `__API_BASE`
/// - `PICOCLAW_TOOLS__EXEC__TIMEOUT` / `PICOCLAW_TOOLS__EXEC__SANDBOX`
/// - `PICOCLAW_TOOLS__WEB__SEARCH__API_KEY`
fn apply_env_overrides(mut config: Config) -> Config {
    let defaults = &mut config.agents.defaults;
    if let Ok(val) = std::env::var("PICOCLAW_AGENTS__DEFAULTS__WORKSPACE") {
        defaults.workspace = val;
    }
    if let Ok(val) = std::env::var("PICOCLAW_AGENTS__DEFAULTS__PROVIDER") {
        defaults.provider = val;
    }
    if let Ok(val) = std::env::var("PICOCLAW_AGENTS__DEFAULTS__MODEL") {
        defaults.model = val;
    }
    if let Some(n) = env_parse::<u32>("PICOCLAW_AGENTS__DEFAULTS__MAX_TOKENS") {
        defaults.max_tokens = n;
    }
    if let Some(n) = env_parse::<u32>("PICOCLAW_AGENTS__DEFAULTS__MAX_TOOL_ITERATIONS") {
        defaults.max_tool_iterations = n;
    }

    apply_provider_env(&mut config.providers.anthropic, "ANTHROPIC");
    apply_provider_env(&mut config.providers.openai, "OPENAI");
    apply_provider_env(&mut config.providers.openrouter, "OPENROUTER");

    if let Some(n) = env_parse::<u64>("PICOCLAW_TOOLS__EXEC__TIMEOUT") {
        config.tools.exec.timeout = n;
    }
    if let Ok(val) = std::env::var("PICOCLAW_TOOLS__EXEC__SANDBOX") {
        config.tools.exec.sandbox = val == "true" || val == "1";
    }

    let search = &mut config.tools.web.search;
    if let Ok(val) = std::env::var("PICOCLAW_TOOLS__WEB__SEARCH__API_KEY") {
        search.api_key = val;
    }
    if search.api_key.is_empty() {
        if let Ok(val) = std::env::var("BRAVE_API_KEY") {
            search.api_key = val;
        }
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("PICOCLAW_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("PICOCLAW_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Ok(val) = std::env::var(format!("{name}_API_KEY")) {
            provider.api_key = val;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
