//! LLM provider handles and their wire formats.

pub mod anthropic;
pub mod backend;
pub mod openai;
pub mod registry;

use std::fmt;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::ProviderError;

pub use backend::{Completion, CompletionBackend, CompletionRequest, HttpProvider, TokenUsage};
pub use registry::ProviderRegistry;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Anthropic];

    /// Identifier used in configuration and in call results.
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Human-readable vendor name for log and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_BASE_URL,
            ProviderKind::Anthropic => anthropic::DEFAULT_BASE_URL,
        }
    }

    pub(crate) fn endpoint_path(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::OpenAiWire::PATH,
            ProviderKind::Anthropic => anthropic::AnthropicWire::PATH,
        }
    }

    pub(crate) fn auth_headers(&self, api_key: &str) -> Result<HeaderMap, ProviderError> {
        match self {
            ProviderKind::OpenAi => openai::OpenAiWire::auth_headers(api_key),
            ProviderKind::Anthropic => anthropic::AnthropicWire::auth_headers(api_key),
        }
    }

    pub(crate) fn build_request(&self, request: &CompletionRequest) -> Value {
        match self {
            ProviderKind::OpenAi => openai::OpenAiWire::build_request(request),
            ProviderKind::Anthropic => anthropic::AnthropicWire::build_request(request),
        }
    }

    pub(crate) fn normalize_response(&self, body: Value) -> Result<Completion, ProviderError> {
        match self {
            ProviderKind::OpenAi => openai::OpenAiWire::normalize_response(body),
            ProviderKind::Anthropic => anthropic::AnthropicWire::normalize_response(body),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One vendor's request/response shape.
///
/// Adding a provider means one new [`ProviderKind`] variant and one type
/// implementing this trait; the dispatcher only ever sees [`Completion`].
pub trait WireFormat {
    /// Path appended to the provider's base URL.
    const PATH: &'static str;

    fn auth_headers(api_key: &str) -> Result<HeaderMap, ProviderError>;

    fn build_request(request: &CompletionRequest) -> Value;

    fn normalize_response(body: Value) -> Result<Completion, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_parse() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.id()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("gemini"), None);
        assert_eq!(ProviderKind::parse("OpenAI"), None);
    }

    #[test]
    fn display_uses_config_id() {
        assert_eq!(ProviderKind::Anthropic.to_string(), "anthropic");
        assert_eq!(ProviderKind::OpenAi.label(), "OpenAI");
    }
}
