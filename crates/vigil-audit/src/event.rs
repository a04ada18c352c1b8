// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The audit event record.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vigil_core::ErrorKind;

/// A fresh request identifier: a v4 UUID as 32 lowercase hex characters.
pub fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Model and prompt sent (or about to be sent) upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub model: String,
    pub prompt: String,
}

/// Request content recorded in an event. Which variant is used is a
/// deployment choice; an event never carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestSnapshot {
    #[serde(rename = "request_redacted")]
    Redacted(RequestSummary),
    #[serde(rename = "request_raw")]
    Raw(RequestSummary),
}

impl RequestSnapshot {
    /// Pick the raw or redacted prompt according to `store_raw`.
    pub fn select(store_raw: bool, model: &str, raw_prompt: &str, redacted_prompt: &str) -> Self {
        if store_raw {
            Self::Raw(RequestSummary {
                model: model.to_string(),
                prompt: raw_prompt.to_string(),
            })
        } else {
            Self::Redacted(RequestSummary {
                model: model.to_string(),
                prompt: redacted_prompt.to_string(),
            })
        }
    }
}

/// One line of the audit log. Immutable once written.
///
/// Holds only the caller key prefix, never the key itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub request_id: String,
    /// Event time; selects the partition the event is written to.
    pub timestamp_ms: i64,
    pub tenant: String,
    pub caller_key_prefix: String,
    pub path: String,
    pub status_code: u16,
    pub latency_ms: u64,
    pub redaction_counts: BTreeMap<String, usize>,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub estimated_cost_usd: f64,
    pub prompt_fingerprint: Option<String>,
    /// Absent when the request was rejected before a prompt was built.
    #[serde(flatten)]
    pub request: Option<RequestSnapshot>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
}

impl AuditEvent {
    /// A new event with zeroed estimates and no content, stamped now.
    pub fn new(
        request_id: impl Into<String>,
        tenant: impl Into<String>,
        caller_key_prefix: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp_ms: now_ms(),
            tenant: tenant.into(),
            caller_key_prefix: caller_key_prefix.into(),
            path: path.into(),
            status_code: 200,
            latency_ms: 0,
            redaction_counts: BTreeMap::new(),
            estimated_input_tokens: 0,
            estimated_output_tokens: 0,
            estimated_cost_usd: 0.0,
            prompt_fingerprint: None,
            request: None,
            error_kind: None,
            error: None,
        }
    }
}
