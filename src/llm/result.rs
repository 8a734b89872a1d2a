//! The normalized call result and the fallback policy.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::provider::TokenUsage;

use super::json::extract_json;

/// Provider name reported in fallback results.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Error text carried by every fallback result.
pub const FALLBACK_ERROR: &str = "AI provider not available";

/// What every dispatch returns, whichever provider answered (or none).
///
/// `content == None` is the single signal callers act on: it means "use
/// your own deterministic text".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub task: String,
    pub content: Option<String>,
    pub model: Option<String>,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResult {
    /// The uniform "no content" result.
    pub fn fallback(task: &str) -> Self {
        Self {
            task: task.to_string(),
            content: None,
            model: None,
            provider: FALLBACK_PROVIDER.to_string(),
            usage: None,
            error: Some(FALLBACK_ERROR.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.content.is_none()
    }

    /// Generated text, or `fallback` when the call produced none.
    pub fn content_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.content.as_deref().unwrap_or(fallback)
    }

    /// Parse a JSON object out of the content.
    ///
    /// Tolerates markdown fences and chatter around the object. `None` for
    /// fallback results and for content that does not parse as `T`.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Option<T> {
        let content = self.content.as_deref()?;
        serde_json::from_str(&extract_json(content)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered(content: &str) -> CallResult {
        CallResult {
            task: "pr_analysis".to_string(),
            content: Some(content.to_string()),
            model: Some("gpt-4o-mini".to_string()),
            provider: "openai".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            }),
            error: None,
        }
    }

    #[test]
    fn fallback_shape() {
        let result = CallResult::fallback("release_analysis");
        assert_eq!(result.task, "release_analysis");
        assert_eq!(result.content, None);
        assert_eq!(result.model, None);
        assert_eq!(result.provider, "fallback");
        assert_eq!(result.usage, None);
        assert_eq!(result.error.as_deref(), Some("AI provider not available"));
        assert!(result.is_fallback());
    }

    #[test]
    fn content_or_prefers_generated_text() {
        assert_eq!(answered("AI text").content_or("canned"), "AI text");
        assert_eq!(CallResult::fallback("t").content_or("canned"), "canned");
    }

    #[test]
    fn parse_json_reads_fenced_object() {
        #[derive(Deserialize)]
        struct Labels {
            labels: Vec<String>,
        }

        let result = answered("Sure:\n```json\n{\"labels\": [\"enhancement\"]}\n```");
        let labels: Labels = result.parse_json().unwrap();
        assert_eq!(labels.labels, vec!["enhancement"]);
    }

    #[test]
    fn parse_json_on_fallback_is_none() {
        let parsed: Option<serde_json::Value> = CallResult::fallback("t").parse_json();
        assert!(parsed.is_none());
    }

    #[test]
    fn serialized_fallback_omits_usage() {
        let json = serde_json::to_value(CallResult::fallback("t")).unwrap();
        assert!(json.get("usage").is_none());
        assert_eq!(json["content"], serde_json::Value::Null);
        assert_eq!(json["error"], "AI provider not available");
    }
}
