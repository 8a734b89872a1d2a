//! Anthropic messages API wire format.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

use super::{Completion, CompletionRequest, TokenUsage, WireFormat};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Messages API version sent with every request.
pub const API_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";

pub struct AnthropicWire;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl WireFormat for AnthropicWire {
    const PATH: &'static str = "/v1/messages";

    fn auth_headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::InvalidCredential { provider: PROVIDER })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-api-key"), key);
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(API_VERSION),
        );
        Ok(headers)
    }

    fn build_request(request: &CompletionRequest) -> Value {
        let body = MessagesRequest {
            model: &request.model,
            system: Some(request.system.as_str()).filter(|s| !s.is_empty()),
            messages: [Message {
                role: "user",
                content: &request.user,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        serde_json::to_value(body).unwrap_or(Value::Null)
    }

    fn normalize_response(body: Value) -> Result<Completion, ProviderError> {
        let response: MessagesResponse =
            serde_json::from_value(body).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let texts: Vec<String> = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if texts.is_empty() {
            return Err(ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: "no text blocks in content".to_string(),
            });
        }

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        });

        Ok(Completion {
            content: texts.concat(),
            usage,
        })
    }
}
