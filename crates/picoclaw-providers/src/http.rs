//! Shared HTTP plumbing: client construction, send + status check, body parsing.

use std::time::Duration;

use picoclaw_core::error::ProviderError;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

/// Fixed request timeout for every vendor call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a pooled client with the given timeout.
///
/// Falls back to a default client if the builder fails (e.g. no TLS backend).
pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Join a base URL and an endpoint path, tolerating a trailing slash.
pub(crate) fn endpoint(api_base: &str, path: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), path)
}

/// Send a prepared request and return the raw body of a successful response.
///
/// Non-2xx statuses become [`ProviderError::Api`] carrying status and body.
pub(crate) async fn send(
    provider: &str,
    timeout: Duration,
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, timeout, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, timeout, e))?;

    if !status.is_success() {
        error!(provider, status = status.as_u16(), body = %body, "API error");
        return Err(ProviderError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

/// Decode a successful response body.
pub(crate) fn parse_body<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        error!(provider, error = %e, "Failed to parse LLM response");
        invalid_response(provider, e.to_string(), body)
    })
}

pub(crate) fn invalid_response(
    provider: &str,
    message: impl Into<String>,
    body: &str,
) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: provider.to_string(),
        message: message.into(),
        body: body.to_string(),
    }
}

fn transport_error(provider: &str, timeout: Duration, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        error!(provider, seconds = timeout.as_secs(), "Request timed out");
        ProviderError::Timeout {
            provider: provider.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        error!(provider, error = %e, "HTTP request failed");
        ProviderError::Transport {
            provider: provider.to_string(),
            message: e.to_string(),
        }
    }
}
