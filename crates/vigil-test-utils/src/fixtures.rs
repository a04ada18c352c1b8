// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy and request fixtures.

use vigil_config::KeyPolicy;

/// Key used by [`TestHarness`](crate::TestHarness) when no policies are given.
pub const TEST_KEY: &str = "test-key-0001";
pub const TEST_TENANT: &str = "acme";

/// A policy with generous limits and no USD caps.
pub fn policy(key: &str, tenant: &str) -> KeyPolicy {
    KeyPolicy {
        key: key.to_string(),
        tenant: tenant.to_string(),
        rpm: 600,
        burst: 100,
        max_requests_per_day: 10_000,
        max_tokens_per_day: 10_000_000,
        max_usd_per_day: 0.0,
        max_usd_per_month: 0.0,
    }
}

pub fn default_policy() -> KeyPolicy {
    policy(TEST_KEY, TEST_TENANT)
}

/// A chat body with a single user message.
pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "messages": [{"role": "user", "content": content}],
    })
    .to_string()
}

/// A chat body with a single user message and an output token cap.
pub fn chat_body_with_max_tokens(content: &str, max_tokens: u32) -> String {
    serde_json::json!({
        "messages": [{"role": "user", "content": content}],
        "max_tokens": max_tokens,
    })
    .to_string()
}
