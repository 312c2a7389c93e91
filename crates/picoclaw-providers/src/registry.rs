//! Provider registry — static specs for the supported vendors, the factory
//! that builds a provider from config, and the name-keyed runtime registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use picoclaw_core::config::schema::{ProviderConfig, ProvidersConfig};
use picoclaw_core::error::ProviderError;

use crate::anthropic::{self, AnthropicProvider};
use crate::openai::{self, OpenAiProvider};
use crate::openrouter::{self, OpenRouterProvider};
use crate::traits::LlmProvider;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one vendor
// ─────────────────────────────────────────────

/// How a vendor expects conversations on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireStyle {
    /// System prompt in a separate field, tool results as content blocks.
    SystemOutOfBand,
    /// Every message inline, tool calls embedded on the assistant message.
    InlineMessage,
}

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name, also the config key (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    pub wire_style: WireStyle,
    pub default_api_base: &'static str,
    pub default_model: &'static str,
    /// Vendor environment variable for the API key.
    pub env_key: &'static str,
}

/// All supported providers, in the order `from_config` registers them.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "anthropic",
        display_name: "Anthropic",
        wire_style: WireStyle::SystemOutOfBand,
        default_api_base: anthropic::DEFAULT_API_BASE,
        default_model: anthropic::DEFAULT_MODEL,
        env_key: "ANTHROPIC_API_KEY",
    },
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        wire_style: WireStyle::InlineMessage,
        default_api_base: openai::DEFAULT_API_BASE,
        default_model: openai::DEFAULT_MODEL,
        env_key: "OPENAI_API_KEY",
    },
    ProviderSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        wire_style: WireStyle::InlineMessage,
        default_api_base: openrouter::DEFAULT_API_BASE,
        default_model: openrouter::DEFAULT_MODEL,
        env_key: "OPENROUTER_API_KEY",
    },
];

/// Find a provider spec by its exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|s| s.name == name)
}

// ─────────────────────────────────────────────
// Factory
// ─────────────────────────────────────────────

/// Build a provider by name from its config.
///
/// `config.api_base`, when set, replaces the vendor's default endpoint.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let spec = find_by_name(name)
        .ok_or_else(|| ProviderError::Config(format!("Unknown provider '{name}'")))?;

    if !config.is_configured() {
        return Err(ProviderError::Config(format!(
            "No API key configured for {} (set {} or providers.{}.apiKey)",
            spec.display_name, spec.env_key, spec.name
        )));
    }

    let api_base = config
        .api_base
        .clone()
        .unwrap_or_else(|| spec.default_api_base.to_string());

    debug!(
        provider = spec.display_name,
        api_base = %api_base,
        "Creating LLM provider"
    );

    let provider: Arc<dyn LlmProvider> = match spec.name {
        "anthropic" => Arc::new(AnthropicProvider::new(&config.api_key).with_api_base(api_base)),
        "openrouter" => Arc::new(OpenRouterProvider::new(&config.api_key).with_api_base(api_base)),
        _ => Arc::new(OpenAiProvider::new(&config.api_key).with_api_base(api_base)),
    };
    Ok(provider)
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Name-keyed collection of providers with a designated default.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    /// Registration order, for listing.
    order: Vec<String>,
    default: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `name`, replacing any previous one.
    ///
    /// The first registered provider becomes the default; a later one takes
    /// over only with `set_default`.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn LlmProvider>, set_default: bool) {
        let name = name.into();
        if !self.providers.contains_key(&name) {
            self.order.push(name.clone());
        }
        if set_default || self.default.is_none() {
            self.default = Some(name.clone());
        }
        debug!(provider = %name, default = set_default, "Registered provider");
        self.providers.insert(name, provider);
    }

    /// Look up a provider by name, or the default when `name` is `None`.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let name = name
            .or(self.default.as_deref())
            .ok_or(ProviderError::NoDefault)?;
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotRegistered(name.to_string()))
    }

    /// Registered provider names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Register every provider that has an API key.
    ///
    /// `preferred` becomes the default if it is among them; otherwise the
    /// first configured provider is.
    pub fn from_config(providers: &ProvidersConfig, preferred: &str) -> Self {
        let mut registry = Self::new();
        for (name, config) in providers.entries() {
            if !config.is_configured() {
                continue;
            }
            match create_provider(name, config) {
                Ok(provider) => registry.register(name, provider, name == preferred),
                Err(e) => warn!(provider = name, error = %e, "Skipping provider"),
            }
        }
        info!(
            providers = ?registry.names(),
            default = registry.default_name().unwrap_or("none"),
            "Provider registry ready"
        );
        registry
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use picoclaw_core::types::{LlmResponse, Message, ToolDefinition};

    use crate::traits::LlmRequestConfig;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            Ok(LlmResponse::text(self.0))
        }

        fn default_model(&self) -> &str {
            self.0
        }

        fn display_name(&self) -> &str {
            self.0
        }
    }

    fn configured(key: &str, base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: key.to_string(),
            api_base: base.map(String::from),
        }
    }

    #[test]
    fn test_specs_have_unique_names() {
        let mut names: Vec<_> = PROVIDERS.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PROVIDERS.len());
    }

    #[test]
    fn test_find_by_name() {
        let spec = find_by_name("anthropic").unwrap();
        assert_eq!(spec.wire_style, WireStyle::SystemOutOfBand);
        assert_eq!(spec.default_model, "claude-3-5-sonnet-20241022");
        assert_eq!(find_by_name("openrouter").unwrap().wire_style, WireStyle::InlineMessage);
        assert!(find_by_name("gemini").is_none());
    }

    #[test]
    fn test_first_registered_is_default() {
        let mut registry = ProviderRegistry::new();
        registry.register("a", Arc::new(FixedProvider("a")), false);
        registry.register("b", Arc::new(FixedProvider("b")), false);

        assert_eq!(registry.default_name(), Some("a"));
        assert_eq!(registry.get(None).unwrap().default_model(), "a");
        assert_eq!(registry.get(Some("b")).unwrap().default_model(), "b");
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_set_default_overrides() {
        let mut registry = ProviderRegistry::new();
        registry.register("a", Arc::new(FixedProvider("a")), false);
        registry.register("b", Arc::new(FixedProvider("b")), true);
        assert_eq!(registry.default_name(), Some("b"));
    }

    #[test]
    fn test_reregister_replaces_without_duplicating() {
        let mut registry = ProviderRegistry::new();
        registry.register("a", Arc::new(FixedProvider("old")), false);
        registry.register("a", Arc::new(FixedProvider("new")), false);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["a"]);
        assert_eq!(registry.get(Some("a")).unwrap().default_model(), "new");
    }

    #[test]
    fn test_get_errors() {
        let registry = ProviderRegistry::new();
        assert_eq!(registry.get(None).err(), Some(ProviderError::NoDefault));
        assert_eq!(
            registry.get(Some("mistral")).err(),
            Some(ProviderError::NotRegistered("mistral".into()))
        );
    }

    #[test]
    fn test_create_provider_uses_spec_defaults() {
        let provider = create_provider("openai", &configured("sk-1", None)).unwrap();
        assert_eq!(provider.display_name(), "OpenAI");
        assert_eq!(provider.default_model(), "gpt-4o");

        let provider = create_provider("openrouter", &configured("sk-or-1", None)).unwrap();
        assert_eq!(provider.default_model(), "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn test_create_provider_requires_key() {
        let err = create_provider("anthropic", &ProviderConfig::default()).err().unwrap();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_create_provider_unknown_name() {
        let err = create_provider("gemini", &configured("k", None)).err().unwrap();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_from_config_registers_only_configured() {
        let mut providers = ProvidersConfig::default();
        providers.anthropic = configured("sk-ant", None);
        providers.openrouter = configured("sk-or", Some("http://localhost:1"));

        let registry = ProviderRegistry::from_config(&providers, "openrouter");

        assert_eq!(registry.names(), vec!["anthropic", "openrouter"]);
        assert_eq!(registry.default_name(), Some("openrouter"));
        assert!(registry.get(Some("openai")).is_err());
    }

    #[test]
    fn test_from_config_falls_back_to_first() {
        let mut providers = ProvidersConfig::default();
        providers.openai = configured("sk-oa", None);

        let registry = ProviderRegistry::from_config(&providers, "anthropic");
        assert_eq!(registry.default_name(), Some("openai"));
    }

    #[tokio::test]
    async fn test_registry_dispatches_chat() {
        let mut registry = ProviderRegistry::new();
        registry.register("fixed", Arc::new(FixedProvider("pong")), true);

        let provider = registry.get(None).unwrap();
        let resp = provider
            .chat(&[Message::user("ping")], None, "", &LlmRequestConfig::default())
            .await
            .unwrap();
        assert_eq!(resp.content, "pong");
    }
}
