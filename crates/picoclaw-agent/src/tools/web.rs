//! Web search tool (Brave Search API).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::base::{optional_u64, require_string, Tool};

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Default number of results.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

// ─────────────────────────────────────────────
// Brave response shape
// ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize, Default)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

fn format_results(results: &[BraveResult], count: usize) -> String {
    results
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n   URL: {}\n   {}",
                i + 1,
                r.title.as_deref().unwrap_or("No title"),
                r.url.as_deref().unwrap_or(""),
                r.description.as_deref().unwrap_or("No description")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─────────────────────────────────────────────
// WebSearchTool
// ─────────────────────────────────────────────

/// Searches the web using the Brave Search API.
pub struct WebSearchTool {
    api_key: String,
    endpoint: String,
    default_count: u32,
    client: Client,
}

impl WebSearchTool {
    /// Create a new web search tool. An empty key makes every call fail with
    /// a "not configured" error.
    pub fn new(api_key: impl Into<String>, default_count: u32) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: BRAVE_SEARCH_URL.to_string(),
            default_count: default_count.max(1),
            client: Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Use a different search endpoint (mock server, proxy).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns top search results with titles, URLs, and snippets."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "count": {
                    "type": "integer",
                    "description": format!("Number of results to return (default: {})", self.default_count),
                    "default": self.default_count
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("Web search API key not configured");
        }
        let query = require_string(&params, "query")?;
        let count = optional_u64(&params, "count")
            .filter(|c| *c > 0)
            .unwrap_or(u64::from(self.default_count));

        debug!(query = %query, count, "searching web");

        let resp = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query.as_str()), ("count", &count.to_string())])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Search failed: {e}"))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(status = status.as_u16(), "search API error");
            anyhow::bail!("Search API returned status {}", status.as_u16());
        }

        let body: BraveResponse = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Search failed: {e}"))?;

        let results = body.web.unwrap_or_default().results;
        if results.is_empty() {
            return Ok("[No results found]".to_string());
        }

        let count = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(format_results(&results, count))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
