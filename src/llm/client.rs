//! The AI client: provider selection, rendering, dispatch and accounting.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{self, Configuration};
use crate::error::AiError;
use crate::prompt::{PromptRenderer, TemplateStore, Variables};
use crate::provider::{CompletionRequest, ProviderKind, ProviderRegistry};

use super::result::CallResult;
use super::retry::{retry_with_backoff, RetryPolicy};
use super::select::{self, ModelChoice};
use super::usage::{estimate_cost, UsageStats, UsageSummary};

/// One per run. Owns the configuration, the provider handles and the
/// usage counters; every call is awaited to completion before the next.
pub struct AiClient {
    config: Configuration,
    renderer: PromptRenderer,
    registry: ProviderRegistry,
    usage: UsageStats,
    retry: RetryPolicy,
}

impl AiClient {
    pub fn new(config: Configuration, templates: TemplateStore, registry: ProviderRegistry) -> Self {
        let client = Self {
            config,
            renderer: PromptRenderer::new(templates),
            registry,
            usage: UsageStats::default(),
            retry: RetryPolicy::default(),
        };

        info!(
            active = client.active_provider().map(|p| p.id()).unwrap_or("none"),
            available = ?client.registry.available(),
            "AI client initialized"
        );
        client
    }

    /// Client built from the installed asset directory and environment
    /// credentials.
    pub fn from_env() -> Self {
        Self::from_asset_dir(&config::asset_dir())
    }

    /// Client reading `ai_config.yml` and `prompts/` from `dir`, with
    /// credentials from the environment.
    pub fn from_asset_dir(dir: &Path) -> Self {
        let config = config::load_from_dir(dir);
        let registry = ProviderRegistry::from_env(&config);
        Self::new(config, TemplateStore::in_asset_dir(dir), registry)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn active_provider(&self) -> Option<ProviderKind> {
        self.registry.active()
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.registry.available()
    }

    pub fn usage(&self) -> &UsageStats {
        &self.usage
    }

    /// Run `task` on the active provider.
    ///
    /// Returns a fallback result (no content) when no provider is active,
    /// no model resolves, or the provider call fails. Returns `Err` only for
    /// a missing template or a missing template variable.
    pub async fn call_ai(&mut self, task: &str, variables: &Variables) -> Result<CallResult, AiError> {
        match self.active_provider() {
            Some(kind) => self.call_with_provider(task, variables, kind.id()).await,
            None => {
                debug!(task, "No active AI provider, returning fallback");
                Ok(CallResult::fallback(task))
            }
        }
    }

    /// Run `task` on a specific provider.
    pub async fn call_with_provider(
        &mut self,
        task: &str,
        variables: &Variables,
        provider_id: &str,
    ) -> Result<CallResult, AiError> {
        let Some(backend) = ProviderKind::parse(provider_id).and_then(|k| self.registry.get(k)) else {
            debug!(task, provider = provider_id, "Provider not available, returning fallback");
            return Ok(CallResult::fallback(task));
        };
        let kind = backend.kind();

        let prompt = self.renderer.render(task, variables)?;

        let Some(choice) = select::resolve(&self.config, task, kind.id()) else {
            warn!(task, provider = %kind, "No model configured for provider, returning fallback");
            return Ok(CallResult::fallback(task));
        };
        let choice = choice.with_template_overrides(&prompt.template.parameters);

        let request = CompletionRequest {
            system: prompt.system,
            user: prompt.user,
            model: choice.model.clone(),
            max_tokens: choice.parameters.max_tokens,
            temperature: choice.parameters.temperature,
            response_format: choice.parameters.response_format.clone(),
        };

        debug!(
            task,
            provider = %kind,
            model = %choice.model,
            max_tokens = choice.parameters.max_tokens,
            temperature = choice.parameters.temperature,
            "Dispatching AI call"
        );

        let completion = match retry_with_backoff(self.retry, || backend.complete(&request)).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(task, provider = %kind, "AI call for task '{}' failed: {}", task, e);
                return Ok(CallResult::fallback(task));
            }
        };

        let cost = completion
            .usage
            .map(|u| {
                estimate_cost(
                    &self.config,
                    kind.id(),
                    &choice.model,
                    u.prompt_tokens,
                    u.completion_tokens,
                )
            })
            .unwrap_or(0.0);
        self.usage.record(completion.usage.as_ref(), cost);

        if self.config.debug.estimate_costs {
            debug!(task, model = %choice.model, "Estimated cost: ${:.6}", cost);
        }

        Ok(CallResult {
            task: task.to_string(),
            content: Some(completion.content),
            model: Some(choice.model),
            provider: kind.id().to_string(),
            usage: completion.usage,
            error: None,
        })
    }

    /// The model and parameters `task` would use on `provider_id`
    /// (the active provider when `None`), without calling anything.
    ///
    /// Loads the task's template so its overrides are included.
    pub fn resolve(&self, task: &str, provider_id: Option<&str>) -> Result<Option<ModelChoice>, AiError> {
        let template = self.renderer.store().load(task)?;

        let provider_id = match provider_id {
            Some(id) => id,
            None => match self.active_provider() {
                Some(kind) => kind.id(),
                None => return Ok(None),
            },
        };

        Ok(select::resolve(&self.config, task, provider_id)
            .map(|choice| choice.with_template_overrides(&template.parameters)))
    }

    pub fn usage_summary(&self) -> UsageSummary {
        UsageSummary::new(
            &self.usage,
            self.active_provider().map(|p| p.id().to_string()),
            self.available_providers()
                .into_iter()
                .map(|p| p.id().to_string())
                .collect(),
        )
    }
}
