//! Per-task model choice and call-parameter layering.

use serde::Serialize;
use serde_json::Value;

use crate::config::{Configuration, ParameterOverrides};

pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fully resolved call parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallParameters {
    pub max_tokens: u32,
    pub temperature: f64,
    /// Seconds. Informational only.
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl Default for CallParameters {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT_SECS,
            response_format: None,
        }
    }
}

impl CallParameters {
    /// Layer `overrides` on top, key by key.
    pub fn overridden_by(self, overrides: &ParameterOverrides) -> Self {
        Self {
            max_tokens: overrides.max_tokens.unwrap_or(self.max_tokens),
            temperature: overrides.temperature.unwrap_or(self.temperature),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            response_format: overrides.response_format.clone().or(self.response_format),
        }
    }
}

/// Model and parameters picked for one task on one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelChoice {
    pub model: String,
    pub complexity: String,
    pub parameters: CallParameters,
}

impl ModelChoice {
    /// Apply a template's own overrides, which take precedence over
    /// everything from configuration.
    pub fn with_template_overrides(mut self, overrides: &ParameterOverrides) -> Self {
        self.parameters = self.parameters.overridden_by(overrides);
        self
    }
}

/// Pick the model for `task` on `provider_id`.
///
/// The task's complexity tag selects an entry in the provider's model
/// table, falling back to the provider's `default_model`. Returns `None`
/// when the provider has no configuration at all.
pub fn resolve(config: &Configuration, task: &str, provider_id: &str) -> Option<ModelChoice> {
    let provider = config.provider(provider_id)?;
    let complexity = config.complexity_for(task);

    let model = provider
        .models
        .get(complexity)
        .unwrap_or(&provider.default_model)
        .clone();

    if model.is_empty() {
        return None;
    }

    let parameters = provider
        .parameters
        .get(&model)
        .map(|o| CallParameters::default().overridden_by(o))
        .unwrap_or_default();

    Some(ModelChoice {
        model,
        complexity: complexity.to_string(),
        parameters,
    })
}
