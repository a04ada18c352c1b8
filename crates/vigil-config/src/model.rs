// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vigil policy engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in `vigil.toml`
//! is a startup error rather than a silently ignored limit.

use serde::{Deserialize, Serialize};

/// Top-level Vigil configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Usage ledger database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Prompt redaction settings.
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Upstream text-generation API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Per-1k-token pricing used for spend estimates.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Caller key policies. Loaded once, immutable for the process lifetime.
    #[serde(default = "default_keys")]
    pub keys: Vec<KeyPolicy>,
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            audit: AuditConfig::default(),
            redaction: RedactionConfig::default(),
            upstream: UpstreamConfig::default(),
            pricing: PricingConfig::default(),
            keys: default_keys(),
        }
    }
}

/// Limits and identity for one caller credential.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyPolicy {
    /// The caller credential. Unique across the policy set.
    pub key: String,

    /// Logical owner of the key.
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Sustained requests per minute. 0 disables rate limiting.
    #[serde(default = "default_rpm")]
    pub rpm: u32,

    /// Token bucket capacity.
    #[serde(default = "default_burst")]
    pub burst: u32,

    #[serde(default = "default_max_requests_per_day")]
    pub max_requests_per_day: u64,

    #[serde(default = "default_max_tokens_per_day")]
    pub max_tokens_per_day: u64,

    /// Daily USD cap. 0 means no cap.
    #[serde(default)]
    pub max_usd_per_day: f64,

    /// Monthly USD cap. 0 means no cap.
    #[serde(default)]
    pub max_usd_per_month: f64,
}

/// Number of leading key characters that may appear in logs and audit events.
pub const KEY_PREFIX_LEN: usize = 6;

/// Shortest accepted key, in characters. Keeps the prefix a strict prefix.
pub const MIN_KEY_LEN: usize = KEY_PREFIX_LEN + 1;

impl KeyPolicy {
    /// Leading characters of the key, safe to log.
    ///
    /// Empty for keys too short to have a strict prefix.
    pub fn key_prefix(&self) -> &str {
        match self.key.char_indices().nth(KEY_PREFIX_LEN) {
            Some((idx, _)) => &self.key[..idx],
            None => "",
        }
    }
}

impl std::fmt::Debug for KeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPolicy")
            .field("key", &format_args!("{}…", self.key_prefix()))
            .field("tenant", &self.tenant)
            .field("rpm", &self.rpm)
            .field("burst", &self.burst)
            .field("max_requests_per_day", &self.max_requests_per_day)
            .field("max_tokens_per_day", &self.max_tokens_per_day)
            .field("max_usd_per_day", &self.max_usd_per_day)
            .field("max_usd_per_month", &self.max_usd_per_month)
            .finish()
    }
}

fn default_tenant() -> String {
    "default".to_string()
}

fn default_rpm() -> u32 {
    60
}

fn default_burst() -> u32 {
    10
}

fn default_max_requests_per_day() -> u64 {
    2000
}

fn default_max_tokens_per_day() -> u64 {
    500_000
}

fn default_keys() -> Vec<KeyPolicy> {
    vec![KeyPolicy {
        key: "demo-dev-key-change-me".to_string(),
        tenant: "demo".to_string(),
        rpm: 30,
        burst: 10,
        max_requests_per_day: 500,
        max_tokens_per_day: 200_000,
        max_usd_per_day: 0.0,
        max_usd_per_month: 0.0,
    }]
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the gateway to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_request_bytes() -> usize {
    256 * 1024
}

/// Usage ledger storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite usage database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "data/usage.sqlite".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Audit trail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Base path of the audit log. Partitions are written next to it as
    /// `<stem>-<YYYY-MM-DD><ext>`.
    #[serde(default = "default_audit_log_path")]
    pub log_path: String,

    /// Store the raw prompt instead of the redacted one.
    #[serde(default)]
    pub store_raw: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: default_audit_log_path(),
            store_raw: false,
        }
    }
}

fn default_audit_log_path() -> String {
    "data/audit.jsonl".to_string()
}

/// Prompt redaction configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionConfig {
    /// Also redact email addresses and North-American phone numbers.
    /// Off by default: both matchers are prone to false positives.
    #[serde(default)]
    pub redact_emails_phones: bool,
}

/// Upstream text-generation API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Upstream API key. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when the request does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Output token estimate when the request sets no `max_tokens`.
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
            default_max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("default_max_tokens", &self.default_max_tokens)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    256
}

/// Token pricing used to estimate spend before the upstream call.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// USD per 1000 input tokens.
    #[serde(default)]
    pub input_per_1k_usd: f64,

    /// USD per 1000 output tokens.
    #[serde(default)]
    pub output_per_1k_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(key: &str) -> KeyPolicy {
        KeyPolicy {
            key: key.to_string(),
            ..default_keys().remove(0)
        }
    }

    #[test]
    fn key_prefix_takes_six_chars() {
        assert_eq!(policy("demo-dev-key").key_prefix(), "demo-d");
        assert_eq!(policy("abc123").key_prefix(), "");
        assert_eq!(policy("abc1234").key_prefix(), "abc123");
    }

    #[test]
    fn key_prefix_respects_char_boundaries() {
        assert_eq!(policy("ключ-секрет").key_prefix(), "ключ-с");
    }

    #[test]
    fn debug_never_prints_full_key() {
        let dbg = format!("{:?}", policy("super-secret-credential"));
        assert!(!dbg.contains("super-secret-credential"));
        assert!(dbg.contains("super-"));
    }

    #[test]
    fn upstream_debug_redacts_api_key() {
        let cfg = UpstreamConfig {
            api_key: Some("sk-live-value".into()),
            ..UpstreamConfig::default()
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("sk-live-value"));
        assert!(dbg.contains("[redacted]"));
    }

    #[test]
    fn key_policy_fields_default_when_omitted() {
        let p: KeyPolicy = toml::from_str(r#"key = "k1""#).unwrap();
        assert_eq!(p.tenant, "default");
        assert_eq!(p.rpm, 60);
        assert_eq!(p.burst, 10);
        assert_eq!(p.max_requests_per_day, 2000);
        assert_eq!(p.max_tokens_per_day, 500_000);
        assert_eq!(p.max_usd_per_day, 0.0);
    }
}
