// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/vigil/vigil.toml`
//! 3. `~/.config/vigil/vigil.toml`
//! 4. `./vigil.toml`
//! 5. `VIGIL_*` environment variables
//! 6. `VIGIL_KEYS_JSON` (replaces the whole key list)
//!
//! When no upstream key is configured anywhere, `OPENAI_API_KEY` is used.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::{KeyPolicy, VigilConfig};

/// Environment variable holding a JSON array of key policies.
pub const KEYS_JSON_ENV: &str = "VIGIL_KEYS_JSON";

/// Fallback environment variable for the upstream API key.
pub const UPSTREAM_KEY_FALLBACK_ENV: &str = "OPENAI_API_KEY";

const SYSTEM_CONFIG: &str = "/etc/vigil/vigil.toml";
const LOCAL_CONFIG: &str = "vigil.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vigil/vigil.toml"))
}

/// Load configuration from the standard file hierarchy with env overrides.
pub fn load_config() -> Result<VigilConfig, figment::Error> {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    let figment = figment.merge(Toml::file(LOCAL_CONFIG));
    finish(figment)
}

/// Load configuration from an explicit file with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<VigilConfig, figment::Error> {
    let figment = Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::file(path));
    finish(figment)
}

/// Load configuration from a TOML string. No env overrides are applied.
pub fn load_config_from_str(toml_content: &str) -> Result<VigilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

fn finish(figment: Figment) -> Result<VigilConfig, figment::Error> {
    let mut figment = figment.merge(env_provider());
    if let Some(keys) = keys_from_env()? {
        figment = figment.merge(Serialized::default("keys", keys));
    }
    let mut config: VigilConfig = figment.extract()?;
    apply_upstream_key_fallback(&mut config);
    Ok(config)
}

/// Parse `VIGIL_KEYS_JSON` when set and non-blank.
fn keys_from_env() -> Result<Option<Vec<KeyPolicy>>, figment::Error> {
    let Ok(raw) = std::env::var(KEYS_JSON_ENV) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let keys: Vec<KeyPolicy> = serde_json::from_str(&raw).map_err(|e| {
        figment::Error::from(format!("{KEYS_JSON_ENV} is not a valid key list: {e}"))
    })?;
    tracing::debug!(count = keys.len(), "key policies loaded from {KEYS_JSON_ENV}");
    Ok(Some(keys))
}

fn apply_upstream_key_fallback(config: &mut VigilConfig) {
    let configured = config
        .upstream
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());
    if configured {
        return;
    }
    config.upstream.api_key = std::env::var(UPSTREAM_KEY_FALLBACK_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty());
}

/// Map `VIGIL_SECTION_FIELD` to `section.field`.
///
/// Uses an explicit section list rather than splitting on `_`, since field
/// names contain underscores (`VIGIL_UPSTREAM_API_KEY` -> `upstream.api_key`).
fn env_provider() -> Env {
    const SECTIONS: [&str; 6] = [
        "server", "storage", "audit", "redaction", "upstream", "pricing",
    ];
    Env::prefixed("VIGIL_")
        .ignore(&["keys_json"])
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            for section in SECTIONS {
                if let Some(field) = key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                {
                    return format!("{section}.{field}").into();
                }
            }
            key_str.into()
        })
}
