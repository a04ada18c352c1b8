// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request counters and latency via the `metrics` facade.
//!
//! Nothing is recorded unless the embedding process installs a recorder.

use metrics::{describe_counter, describe_histogram};

/// Register metric descriptions. Call once at startup.
pub fn register_metrics() {
    describe_counter!("vigil_requests_total", "Chat requests by outcome kind");
    describe_counter!("vigil_estimated_tokens_total", "Estimated tokens charged");
    describe_histogram!(
        "vigil_request_latency_seconds",
        "Chat request latency including the upstream call"
    );
}

/// Count one chat request; `outcome` is `ok` or an error kind.
pub fn record_request(tenant: &str, outcome: &str) {
    metrics::counter!(
        "vigil_requests_total",
        "tenant" => tenant.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

pub fn record_tokens(tenant: &str, tokens: u64) {
    metrics::counter!("vigil_estimated_tokens_total", "tenant" => tenant.to_string())
        .increment(tokens);
}

pub fn record_latency(seconds: f64) {
    metrics::histogram!("vigil_request_latency_seconds").record(seconds);
}
