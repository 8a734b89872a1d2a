//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use augur::AiClient;
use augur::config::{Configuration, ModelPricing, ProviderConfig, TaskModel};
use augur::llm::RetryPolicy;
use augur::prompt::TemplateStore;
use augur::provider::ProviderRegistry;
use serde_json::{Value, json};

/// The asset directory shipped with the repository.
pub fn shipped_asset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `prompts/<task>.yml` under `dir`.
pub fn write_template(dir: &Path, task: &str, content: &str) {
    let prompts = dir.join("prompts");
    std::fs::create_dir_all(&prompts).expect("Failed to create prompts dir");
    std::fs::write(prompts.join(format!("{task}.yml")), content)
        .expect("Failed to write template");
}

/// Template for the `release_analysis` task used across dispatch tests.
pub fn write_release_template(dir: &Path) {
    write_template(
        dir,
        "release_analysis",
        r#"
system_prompt: You summarise releases of {role}.
user_prompt: "Commits since {previous_version}: {commits}"
parameters:
  max_tokens: 800
"#,
    );
}

/// Configuration pointing both providers at `base_url`.
pub fn config_for_server(base_url: &str) -> Configuration {
    let mut openai = ProviderConfig::with_default_model("gpt-4o-mini");
    openai.models.insert("deep".to_string(), "gpt-4o".to_string());
    openai.pricing.insert(
        "gpt-4o".to_string(),
        ModelPricing {
            input_price_per_1k: 0.0025,
            output_price_per_1k: 0.01,
        },
    );
    openai.base_url = Some(base_url.to_string());

    let mut anthropic = ProviderConfig::with_default_model("claude-3-5-haiku-latest");
    anthropic
        .models
        .insert("deep".to_string(), "claude-3-5-sonnet-latest".to_string());
    anthropic.base_url = Some(base_url.to_string());

    let mut config = Configuration::builtin();
    config.providers.insert("openai".to_string(), openai);
    config.providers.insert("anthropic".to_string(), anthropic);
    config.task_models.insert(
        "release_analysis".to_string(),
        TaskModel {
            complexity: "deep".to_string(),
        },
    );
    config
}

/// Client over `config` with the given credentials and near-instant retries.
pub fn client_with_keys(config: Configuration, asset_dir: &Path, keys: &[(&str, &str)]) -> AiClient {
    let keys: Vec<(String, String)> = keys
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let registry = ProviderRegistry::with_credentials(&config, |var| {
        keys.iter().find(|(k, _)| k == var).map(|(_, v)| v.clone())
    });

    AiClient::new(config, TemplateStore::in_asset_dir(asset_dir), registry).with_retry_policy(
        RetryPolicy {
            max_attempts: 3,
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(5),
        },
    )
}

/// A chat completions response body.
pub fn openai_body(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-2024-08-06",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// A messages API response body.
pub fn anthropic_body(content: &str, input_tokens: u64, output_tokens: u64) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": content}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": input_tokens, "output_tokens": output_tokens}
    })
}
