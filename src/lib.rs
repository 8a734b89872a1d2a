//! augur - provider-agnostic LLM calls for pull request and release automation.
//!
//! # Overview
//!
//! CI scripts (doc updater, PR analyzer, PR assistant, release analyzer,
//! changelog updater) ask an [`AiClient`] to run a named task with a set of
//! variables. The client renders the task's prompt template, picks a model
//! for the active provider (OpenAI or Anthropic), calls it, and returns a
//! [`CallResult`]. When no provider is configured or the call fails, the
//! result has no content and the caller uses its own rule-based text.

pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod provider;

// Re-export commonly used types
pub use config::Configuration;
pub use error::{AiError, ConfigError, ProviderError, RenderError, TemplateError};
pub use llm::{AiClient, CallResult, UsageSummary};
pub use prompt::Variables;
pub use provider::{ProviderKind, TokenUsage};
