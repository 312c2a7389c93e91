//! Token usage normalization.
//!
//! Vendors disagree on field names (`input_tokens` vs `prompt_tokens`, …) and
//! on whether a total is reported. Everything lands on [`UsageInfo`].

use picoclaw_core::types::UsageInfo;
use serde::Deserialize;

/// Usage block as any supported vendor reports it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawUsage {
    #[serde(default, alias = "input_tokens")]
    prompt_tokens: Option<u64>,
    #[serde(default, alias = "output_tokens")]
    completion_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<RawUsage> for UsageInfo {
    fn from(raw: RawUsage) -> Self {
        let prompt = raw.prompt_tokens.unwrap_or(0);
        let completion = raw.completion_tokens.unwrap_or(0);
        UsageInfo::new(prompt, completion, raw.total_tokens.unwrap_or(prompt + completion))
    }
}

/// Normalize an optional (possibly `null`) usage block.
pub(crate) fn normalize(raw: Option<RawUsage>) -> UsageInfo {
    raw.map(UsageInfo::from).unwrap_or_default()
}
