// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! All failures are collected; validation does not stop at the first one.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{VigilConfig, MIN_KEY_LEN};

/// Validate a deserialized configuration.
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.server.max_request_bytes == 0 {
        errors.push(ConfigError::validation(
            "server.max_request_bytes must be greater than 0",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.audit.log_path.trim().is_empty() {
        errors.push(ConfigError::validation("audit.log_path must not be empty"));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "upstream.timeout_secs must be greater than 0",
        ));
    }

    if config.upstream.default_model.trim().is_empty() {
        errors.push(ConfigError::validation(
            "upstream.default_model must not be empty",
        ));
    }

    for (name, value) in [
        ("pricing.input_per_1k_usd", config.pricing.input_per_1k_usd),
        ("pricing.output_per_1k_usd", config.pricing.output_per_1k_usd),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::validation(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
    }

    validate_keys(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_keys(config: &VigilConfig, errors: &mut Vec<ConfigError>) {
    let mut seen = HashSet::new();

    for (idx, policy) in config.keys.iter().enumerate() {
        let label = format!("keys[{idx}]");

        if policy.key.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "{label}.key must not be empty"
            )));
        } else if policy.key.chars().count() < MIN_KEY_LEN {
            errors.push(ConfigError::validation(format!(
                "{label}.key must be at least {MIN_KEY_LEN} characters"
            )));
        } else if !seen.insert(policy.key.as_str()) {
            errors.push(ConfigError::validation(format!(
                "{label}.key duplicates an earlier entry (prefix `{}`)",
                policy.key_prefix()
            )));
        }

        if policy.tenant.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "{label}.tenant must not be empty"
            )));
        }

        if policy.rpm > 0 && policy.burst == 0 {
            errors.push(ConfigError::validation(format!(
                "{label}.burst must be at least 1 when rpm is set"
            )));
        }

        for (field, value) in [
            ("max_usd_per_day", policy.max_usd_per_day),
            ("max_usd_per_month", policy.max_usd_per_month),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::validation(format!(
                    "{label}.{field} must be non-negative, got {value}"
                )));
            }
        }
    }
}
