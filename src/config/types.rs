//! Configuration schema and the built-in default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complexity tag used when a task has no entry in `task_models`.
pub const DEFAULT_COMPLEXITY: &str = "standard";

/// Provider/task/pricing configuration, read once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Provider identifiers in activation order.
    #[serde(default = "default_priority")]
    pub provider_priority: Vec<String>,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub task_models: BTreeMap<String, TaskModel>,

    #[serde(default)]
    pub debug: DebugConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Per-provider model table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub default_model: String,

    /// Complexity tag to model id.
    #[serde(default)]
    pub models: BTreeMap<String, String>,

    /// Model id to call-parameter overrides.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterOverrides>,

    /// Model id to per-1000-token prices in USD.
    #[serde(default)]
    pub pricing: BTreeMap<String, ModelPricing>,

    /// API root override (gateway, proxy). Uses the vendor endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Partial call parameters. Unset keys inherit from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Seconds. Advisory only; not enforced on the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// OpenAI `response_format` object, e.g. `{type: json_object}`.
    /// Passed through verbatim; other providers ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(alias = "input")]
    pub input_price_per_1k: f64,

    #[serde(alias = "output")]
    pub output_price_per_1k: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskModel {
    #[serde(default = "default_complexity")]
    pub complexity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log the end-of-run usage line with its estimated cost.
    #[serde(default = "default_true")]
    pub estimate_costs: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            estimate_costs: true,
        }
    }
}

/// Fallback policy descriptor. Advisory: callers own their fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message: None,
        }
    }
}

fn default_priority() -> Vec<String> {
    vec!["openai".to_string(), "anthropic".to_string()]
}

fn default_complexity() -> String {
    DEFAULT_COMPLEXITY.to_string()
}

fn default_true() -> bool {
    true
}

impl Configuration {
    /// Minimal configuration used when the config file is missing or broken.
    pub fn builtin() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "openai".to_string(),
            ProviderConfig::with_default_model("gpt-4o-mini"),
        );
        providers.insert(
            "anthropic".to_string(),
            ProviderConfig::with_default_model("claude-3-5-haiku-latest"),
        );

        Self {
            provider_priority: default_priority(),
            providers,
            task_models: BTreeMap::new(),
            debug: DebugConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }

    /// Complexity tag configured for `task`, or [`DEFAULT_COMPLEXITY`].
    pub fn complexity_for(&self, task: &str) -> &str {
        self.task_models
            .get(task)
            .map(|t| t.complexity.as_str())
            .unwrap_or(DEFAULT_COMPLEXITY)
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.get(id)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderConfig {
    /// A provider that maps every complexity to a single model.
    pub fn with_default_model(model: &str) -> Self {
        let mut models = BTreeMap::new();
        models.insert(DEFAULT_COMPLEXITY.to_string(), model.to_string());
        Self {
            default_model: model.to_string(),
            models,
            parameters: BTreeMap::new(),
            pricing: BTreeMap::new(),
            base_url: None,
        }
    }
}
