// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller authentication against the loaded key policies.

use std::collections::HashMap;
use std::sync::Arc;

use vigil_config::{KeyPolicy, MIN_KEY_LEN};
use vigil_core::VigilError;

/// Immutable mapping from caller key to its policy.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    by_key: HashMap<String, Arc<KeyPolicy>>,
}

impl PolicySet {
    /// Build the set. Fails if any key appears twice or is shorter than
    /// [`MIN_KEY_LEN`] characters.
    pub fn new(policies: impl IntoIterator<Item = KeyPolicy>) -> Result<Self, VigilError> {
        let mut by_key = HashMap::new();
        for (idx, policy) in policies.into_iter().enumerate() {
            if policy.key.chars().count() < MIN_KEY_LEN {
                return Err(VigilError::Config(format!(
                    "key policy #{idx} has a key shorter than {MIN_KEY_LEN} characters"
                )));
            }
            if by_key.contains_key(&policy.key) {
                return Err(VigilError::Config(format!(
                    "duplicate key policy for key prefix `{}`",
                    policy.key_prefix()
                )));
            }
            by_key.insert(policy.key.clone(), Arc::new(policy));
        }
        Ok(Self { by_key })
    }

    pub fn get(&self, key: &str) -> Option<Arc<KeyPolicy>> {
        self.by_key.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Distinct tenants, sorted.
    pub fn tenants(&self) -> Vec<&str> {
        let mut tenants: Vec<&str> = self.by_key.values().map(|p| p.tenant.as_str()).collect();
        tenants.sort_unstable();
        tenants.dedup();
        tenants
    }
}

/// Resolve a presented credential to its policy.
///
/// An absent or empty credential is `AuthenticationMissing`; one that does not
/// exactly match a key in the set is `AuthenticationInvalid`.
pub fn authenticate(
    policies: &PolicySet,
    presented: Option<&str>,
) -> Result<Arc<KeyPolicy>, VigilError> {
    let key = presented
        .filter(|k| !k.is_empty())
        .ok_or(VigilError::AuthenticationMissing)?;
    policies.get(key).ok_or(VigilError::AuthenticationInvalid)
}
