//! Provider-level errors.
//!
//! These are the only faults that end a conversation turn. Tool failures never
//! surface here; they are fed back to the model as `[ERROR] …` text.

use thiserror::Error;

/// A failed model round trip (or a provider lookup that cannot be served).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The vendor answered with a non-success HTTP status.
    #[error("{provider} API error: {status} - {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The request did not complete within the fixed timeout.
    #[error("{provider} request timed out after {seconds} seconds")]
    Timeout { provider: String, seconds: u64 },

    /// Connection, TLS, or other transport failure.
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// 2xx response whose body could not be turned into a uniform result.
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: String,
        message: String,
        body: String,
    },

    #[error("Provider '{0}' not found")]
    NotRegistered(String),

    #[error("No provider specified and no default provider set")]
    NoDefault,

    #[error("Provider configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// HTTP status of the failed call, when the vendor answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            ProviderError::Api { body, .. } | ProviderError::InvalidResponse { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}
