//! The provider-agnostic completion seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;

use super::ProviderKind;

/// Longest error body kept in [`ProviderError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Whole-request ceiling, matching the vendor SDK default (10 minutes).
/// Per-task `timeout` parameters are advisory and not applied here.
const CLIENT_TIMEOUT_SECS: u64 = 600;

/// A fully rendered, fully parameterised request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// May be empty, in which case no system prompt is sent.
    pub system: String,
    pub user: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Structured-output hint. Only the OpenAI wire format sends it.
    pub response_format: Option<Value>,
}

/// Token counts reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// A provider response reduced to what callers need.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Something that can turn a [`CompletionRequest`] into a [`Completion`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Provider handle that talks to the vendor's HTTP API.
#[derive(Debug)]
pub struct HttpProvider {
    kind: ProviderKind,
    http: Client,
    endpoint: String,
}

impl HttpProvider {
    /// Build a handle for `kind` authenticated with `api_key`.
    ///
    /// `base_url` replaces the vendor's public endpoint when set.
    pub fn new(
        kind: ProviderKind,
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        let headers = kind.auth_headers(api_key)?;

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("augur/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|source| ProviderError::ClientBuild {
                provider: kind.label(),
                source,
            })?;

        let base = base_url.unwrap_or(kind.default_base_url());
        let endpoint = format!("{}{}", base.trim_end_matches('/'), kind.endpoint_path());

        Ok(Self {
            kind,
            http,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for HttpProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let provider = self.kind.label();
        let body = self.kind.build_request(request);

        debug!(provider = %self.kind, model = %request.model, "Sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Http { provider, source })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider,
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let payload: Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    provider,
                    reason: e.to_string(),
                })?;

        self.kind.normalize_response(payload)
    }
}
