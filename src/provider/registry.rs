//! Provider activation from credentials and priority order.

use std::env;

use tracing::{debug, info, warn};

use crate::config::Configuration;

use super::{CompletionBackend, HttpProvider, ProviderKind};

/// Constructed provider handles, in activation order.
///
/// The first handle added becomes the active provider. An empty registry
/// is valid: every dispatch then yields a fallback result.
#[derive(Default)]
pub struct ProviderRegistry {
    clients: Vec<Box<dyn CompletionBackend>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set up providers using API keys from the process environment.
    pub fn from_env(config: &Configuration) -> Self {
        Self::with_credentials(config, |var| env::var(var).ok())
    }

    /// Set up providers using API keys from `lookup`, which maps a
    /// credential variable name to its value.
    ///
    /// Walks `provider_priority` in order. A provider without a credential
    /// is skipped; one whose construction fails is logged and skipped.
    pub fn with_credentials<F>(config: &Configuration, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut registry = Self::empty();

        for id in &config.provider_priority {
            let Some(kind) = ProviderKind::parse(id) else {
                warn!(provider = %id, "Unknown AI provider in provider_priority, skipping");
                continue;
            };

            if registry.get(kind).is_some() {
                continue;
            }

            let Some(api_key) = lookup(kind.credential_var()).filter(|k| !k.is_empty()) else {
                debug!(provider = %kind, "{} not set", kind.credential_var());
                continue;
            };

            let base_url = config.provider(id).and_then(|p| p.base_url.as_deref());

            match HttpProvider::new(kind, &api_key, base_url) {
                Ok(handle) => registry.insert(Box::new(handle)),
                Err(e) => warn!(provider = %kind, "Failed to initialize {} client: {}", kind.label(), e),
            }
        }

        if registry.active().is_none() {
            info!("No AI provider available, using fallback responses");
        }

        registry
    }

    /// Add a handle. Ignored if a handle of the same kind is already present.
    pub fn insert(&mut self, backend: Box<dyn CompletionBackend>) {
        let kind = backend.kind();
        if self.get(kind).is_some() {
            return;
        }

        if self.clients.is_empty() {
            info!(provider = %kind, "Using {} as active AI provider", kind.label());
        } else {
            debug!(provider = %kind, "{} available as alternate provider", kind.label());
        }
        self.clients.push(backend);
    }

    /// The first provider that was successfully set up.
    pub fn active(&self) -> Option<ProviderKind> {
        self.clients.first().map(|c| c.kind())
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&dyn CompletionBackend> {
        self.clients
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| &**c)
    }

    /// Kinds with a handle, in activation order.
    pub fn available(&self) -> Vec<ProviderKind> {
        self.clients.iter().map(|c| c.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn no_credentials_means_no_active_provider() {
        let registry = ProviderRegistry::with_credentials(&Configuration::builtin(), lookup(&[]));
        assert!(registry.is_empty());
        assert_eq!(registry.active(), None);
        assert!(registry.available().is_empty());
    }

    #[test]
    fn first_in_priority_wins() {
        let registry = ProviderRegistry::with_credentials(
            &Configuration::builtin(),
            lookup(&[("OPENAI_API_KEY", "sk-1"), ("ANTHROPIC_API_KEY", "sk-ant-1")]),
        );
        assert_eq!(registry.active(), Some(ProviderKind::OpenAi));
        assert_eq!(
            registry.available(),
            vec![ProviderKind::OpenAi, ProviderKind::Anthropic]
        );
    }

    #[test]
    fn priority_order_is_respected() {
        let mut config = Configuration::builtin();
        config.provider_priority = vec!["anthropic".to_string(), "openai".to_string()];

        let registry = ProviderRegistry::with_credentials(
            &config,
            lookup(&[("OPENAI_API_KEY", "sk-1"), ("ANTHROPIC_API_KEY", "sk-ant-1")]),
        );
        assert_eq!(registry.active(), Some(ProviderKind::Anthropic));
    }

    #[test]
    fn only_second_provider_credentialed() {
        let registry = ProviderRegistry::with_credentials(
            &Configuration::builtin(),
            lookup(&[("ANTHROPIC_API_KEY", "sk-ant-1")]),
        );
        assert_eq!(registry.active(), Some(ProviderKind::Anthropic));
        assert!(registry.get(ProviderKind::OpenAi).is_none());
    }

    #[test]
    fn empty_credential_counts_as_absent() {
        let registry = ProviderRegistry::with_credentials(
            &Configuration::builtin(),
            lookup(&[("OPENAI_API_KEY", ""), ("ANTHROPIC_API_KEY", "sk-ant-1")]),
        );
        assert_eq!(registry.active(), Some(ProviderKind::Anthropic));
    }

    #[test]
    fn construction_failure_does_not_stop_later_providers() {
        let registry = ProviderRegistry::with_credentials(
            &Configuration::builtin(),
            lookup(&[("OPENAI_API_KEY", "bad\nkey"), ("ANTHROPIC_API_KEY", "sk-ant-1")]),
        );
        assert_eq!(registry.active(), Some(ProviderKind::Anthropic));
        assert_eq!(registry.available(), vec![ProviderKind::Anthropic]);
    }

    #[test]
    fn unknown_and_duplicate_ids_are_skipped() {
        let mut config = Configuration::builtin();
        config.provider_priority = vec![
            "gemini".to_string(),
            "openai".to_string(),
            "openai".to_string(),
        ];

        let registry =
            ProviderRegistry::with_credentials(&config, lookup(&[("OPENAI_API_KEY", "sk-1")]));
        assert_eq!(registry.available(), vec![ProviderKind::OpenAi]);
    }

    #[test]
    fn from_env_reads_process_environment() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", None::<&str>),
                ("ANTHROPIC_API_KEY", Some("sk-ant-env")),
            ],
            || {
                let registry = ProviderRegistry::from_env(&Configuration::builtin());
                assert_eq!(registry.active(), Some(ProviderKind::Anthropic));
            },
        );
    }
}
