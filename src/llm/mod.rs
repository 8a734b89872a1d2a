//! AI call pipeline: model selection, dispatch, fallback and usage.

pub mod client;
pub mod json;
pub mod result;
pub mod retry;
pub mod select;
pub mod usage;

pub use client::AiClient;
pub use json::extract_json;
pub use result::{CallResult, FALLBACK_ERROR, FALLBACK_PROVIDER};
pub use retry::RetryPolicy;
pub use select::{CallParameters, ModelChoice};
pub use usage::{estimate_cost, UsageStats, UsageSummary};
