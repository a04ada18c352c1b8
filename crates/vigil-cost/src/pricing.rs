// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token and cost estimation.
//!
//! Tokens are estimated at four characters per token. Cost uses the
//! configured per-1k prices; negative prices count as zero.

use vigil_config::PricingConfig;
use vigil_core::UsageDelta;

const CHARS_PER_TOKEN: u64 = 4;

/// Estimated token count of `text`: `max(1, ceil(chars / 4))`.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(CHARS_PER_TOKEN).max(1)
}

/// Estimated USD cost for the given token counts.
pub fn estimate_cost_usd(pricing: &PricingConfig, input_tokens: u64, output_tokens: u64) -> f64 {
    if pricing.input_per_1k_usd <= 0.0 && pricing.output_per_1k_usd <= 0.0 {
        return 0.0;
    }
    (input_tokens as f64 / 1000.0) * pricing.input_per_1k_usd.max(0.0)
        + (output_tokens as f64 / 1000.0) * pricing.output_per_1k_usd.max(0.0)
}

/// Pre-flight usage estimate for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageEstimate {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl UsageEstimate {
    /// Estimate a request for `prompt` that may generate up to `max_output_tokens`.
    pub fn for_prompt(pricing: &PricingConfig, prompt: &str, max_output_tokens: u32) -> Self {
        let input_tokens = estimate_tokens(prompt);
        let output_tokens = u64::from(max_output_tokens);
        Self {
            input_tokens,
            output_tokens,
            cost_usd: estimate_cost_usd(pricing, input_tokens, output_tokens),
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// The ledger delta for this estimate: one request, all estimated tokens.
    pub fn to_delta(&self) -> UsageDelta {
        UsageDelta::single_request(self.total_tokens(), self.cost_usd)
    }
}
