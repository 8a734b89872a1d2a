//! Usage accounting and best-effort cost estimation.

use serde::Serialize;

use crate::config::Configuration;
use crate::provider::TokenUsage;

/// Counters owned by one client for the length of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageStats {
    /// Completed API calls.
    pub requests: u64,
    pub tokens_used: u64,
    /// USD, never decreases.
    pub estimated_cost: f64,
}

impl UsageStats {
    /// Record one completed call.
    pub fn record(&mut self, usage: Option<&TokenUsage>, cost: f64) {
        self.requests += 1;
        if let Some(usage) = usage {
            self.tokens_used += usage.total_tokens;
        }
        if cost.is_finite() && cost > 0.0 {
            self.estimated_cost += cost;
        }
    }
}

/// Snapshot returned by [`crate::AiClient::usage_summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub requests_made: u64,
    pub total_tokens: u64,
    /// Rounded to 4 decimal places.
    pub estimated_cost_usd: f64,
    pub active_provider: Option<String>,
    pub available_providers: Vec<String>,
}

impl UsageSummary {
    pub fn new(stats: &UsageStats, active: Option<String>, available: Vec<String>) -> Self {
        Self {
            requests_made: stats.requests,
            total_tokens: stats.tokens_used,
            estimated_cost_usd: round4(stats.estimated_cost),
            active_provider: active,
            available_providers: available,
        }
    }
}

/// Cost in USD of one call, from per-1000-token prices in `config`.
///
/// Unpriced models cost `0.0`.
pub fn estimate_cost(
    config: &Configuration,
    provider_id: &str,
    model: &str,
    input_tokens: u64,
    output_tokens: u64,
) -> f64 {
    let Some(pricing) = config
        .provider(provider_id)
        .and_then(|p| p.pricing.get(model))
    else {
        return 0.0;
    };

    (input_tokens as f64 / 1000.0) * pricing.input_price_per_1k
        + (output_tokens as f64 / 1000.0) * pricing.output_price_per_1k
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
