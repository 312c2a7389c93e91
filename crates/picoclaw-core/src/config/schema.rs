//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentsConfig`, `ProvidersConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::expand_home;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.picoclaw/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Workspace directory with `~` expanded.
    pub fn workspace_path(&self) -> PathBuf {
        expand_home(&self.agents.defaults.workspace)
    }
}

// ─────────────────────────────────────────────
// Agents
// ─────────────────────────────────────────────

/// Agent configuration container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

/// Default agent settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    /// Workspace directory all file tools are confined to.
    pub workspace: String,
    /// Name of the default provider (`anthropic`, `openai`, `openrouter`).
    pub provider: String,
    /// Model identifier. Empty means "use the provider's default model".
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature. Not sent when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum model round trips per conversation turn.
    pub max_tool_iterations: u32,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            workspace: "~/.picoclaw/workspace".to_string(),
            provider: "anthropic".to_string(),
            model: String::new(),
            max_tokens: 4096,
            temperature: None,
            max_tool_iterations: 10,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub anthropic: ProviderConfig,
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (e.g. `"anthropic"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "anthropic" => Some(&self.anthropic),
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            _ => None,
        }
    }

    /// `(name, config)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, &ProviderConfig); 3] {
        [
            ("anthropic", &self.anthropic),
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
        ]
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub web: WebToolsConfig,
    pub exec: ExecToolConfig,
}

/// Web tools configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebToolsConfig {
    pub search: WebSearchConfig,
}

/// Web search configuration (Brave API).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSearchConfig {
    /// Brave Search API key. The web_search tool is only registered when set.
    pub api_key: String,
    /// Default number of results when the model does not ask for a count.
    pub max_results: u32,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_results: 5,
        }
    }
}

/// Shell tool configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecToolConfig {
    /// Timeout in seconds for shell commands.
    pub timeout: u64,
    /// Refuse commands matching the dangerous-command denylist.
    pub sandbox: bool,
}

impl Default for ExecToolConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            sandbox: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agents.defaults.provider, "anthropic");
        assert_eq!(config.agents.defaults.max_tokens, 4096);
        assert_eq!(config.agents.defaults.max_tool_iterations, 10);
        assert!(config.agents.defaults.model.is_empty());
        assert_eq!(config.tools.exec.timeout, 30);
        assert!(config.workspace_path().ends_with(".picoclaw/workspace"));
        assert!(config.tools.exec.sandbox);
        assert_eq!(config.tools.web.search.max_results, 5);
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = r#"{
            "agents": {"defaults": {"provider": "openrouter", "maxToolIterations": 3}},
            "providers": {"openrouter": {"apiKey": "sk-or-1", "apiBase": "http://localhost:9"}},
            "tools": {"exec": {"sandbox": false}}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.agents.defaults.provider, "openrouter");
        assert_eq!(config.agents.defaults.max_tool_iterations, 3);
        assert_eq!(config.agents.defaults.max_tokens, 4096);
        assert!(config.providers.openrouter.is_configured());
        assert_eq!(
            config.providers.openrouter.api_base.as_deref(),
            Some("http://localhost:9")
        );
        assert!(!config.tools.exec.sandbox);
        assert_eq!(config.tools.exec.timeout, 30);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["agents"]["defaults"].get("maxToolIterations").is_some());
        assert!(raw["agents"]["defaults"].get("temperature").is_none());
    }

    #[test]
    fn test_providers_get_by_name() {
        let mut providers = ProvidersConfig::default();
        providers.openai.api_key = "sk-123".into();
        assert!(providers.get_by_name("openai").unwrap().is_configured());
        assert!(!providers.get_by_name("anthropic").unwrap().is_configured());
        assert!(providers.get_by_name("gemini").is_none());
        assert_eq!(providers.entries()[2].0, "openrouter");
    }
}
