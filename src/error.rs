//! Error types for augur modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading the configuration file.
///
/// Never escapes [`crate::config::load`]; any of these degrades to the
/// built-in default configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from loading prompt templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Prompt template for task '{task}' not found at {path}")]
    NotFound { task: String, path: PathBuf },

    #[error("Failed to read prompt template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse prompt template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from substituting variables into a prompt template.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Prompt template for task '{task}' requires variable '{variable}' which was not provided")]
    MissingVariable { task: String, variable: String },

    #[error("Prompt template for task '{task}' is malformed at byte {position}: {reason}")]
    MalformedTemplate {
        task: String,
        position: usize,
        reason: String,
    },
}

/// Errors from a live provider call.
///
/// All of these are transient from the caller's point of view and are
/// turned into a fallback result by the dispatcher.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Credential for {provider} contains characters not allowed in an HTTP header")]
    InvalidCredential { provider: &'static str },

    #[error("Failed to build HTTP client for {provider}: {source}")]
    ClientBuild {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a response that could not be understood: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("All {attempts} attempts failed: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Rate limits, server errors and transport failures are retryable;
    /// auth failures, bad requests and unparseable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::InvalidCredential { .. }
            | ProviderError::ClientBuild { .. }
            | ProviderError::MalformedResponse { .. }
            | ProviderError::RetriesExhausted { .. } => false,
        }
    }
}

/// Errors surfaced to callers of [`crate::AiClient::call_ai`].
///
/// These are packaging or input defects, never provider trouble, and are
/// meant to fail the calling job.
#[derive(Error, Debug)]
pub enum AiError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
