// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the ledger, budget, and gateway crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Time granularity over which usage is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Day,
    Month,
}

impl Scope {
    /// UTC scope key for the given instant: `YYYY-MM-DD` or `YYYY-MM`.
    pub fn key_at(self, at: DateTime<Utc>) -> String {
        match self {
            Scope::Day => at.format("%Y-%m-%d").to_string(),
            Scope::Month => at.format("%Y-%m").to_string(),
        }
    }
}

/// Cumulative totals for one (scope, scope key, caller key) triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub requests: u64,
    pub tokens: u64,
    pub usd: f64,
}

/// An additive change applied to a usage row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDelta {
    pub requests: u64,
    pub tokens: u64,
    pub usd: f64,
}

impl UsageDelta {
    /// A charge of one request with the given token and USD estimate.
    pub fn single_request(tokens: u64, usd: f64) -> Self {
        Self {
            requests: 1,
            tokens,
            usd,
        }
    }
}

/// A single upstream text-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Upstream model identifier.
    pub model: String,
    /// Prompt text (already redacted).
    pub prompt: String,
    /// Sampling temperature, upstream default when absent.
    pub temperature: Option<f64>,
    /// Output token cap, upstream default when absent.
    pub max_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scope_keys_are_utc_calendar_strings() {
        let at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        assert_eq!(Scope::Day.key_at(at), "2025-01-31");
        assert_eq!(Scope::Month.key_at(at), "2025-01");
    }

    #[test]
    fn scope_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(Scope::Day.to_string(), "day");
        assert_eq!(Scope::from_str("month").unwrap(), Scope::Month);
    }
}
