//! OpenAI chat completions wire format.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

use super::{Completion, CompletionRequest, TokenUsage, WireFormat};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "OpenAI";

pub struct OpenAiWire;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

impl WireFormat for OpenAiWire {
    const PATH: &'static str = "/v1/chat/completions";

    fn auth_headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ProviderError::InvalidCredential { provider: PROVIDER })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn build_request(request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.user,
        });

        let body = ChatRequest {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.response_format.as_ref(),
        };
        serde_json::to_value(body).unwrap_or(Value::Null)
    }

    fn normalize_response(body: Value) -> Result<Completion, ProviderError> {
        let response: ChatResponse =
            serde_json::from_value(body).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: "no message content in choices".to_string(),
            })?;

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u
                .total_tokens
                .unwrap_or(u.prompt_tokens + u.completion_tokens),
        });

        Ok(Completion { content, usage })
    }
}
