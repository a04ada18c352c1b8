// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-key rate limiting.
//!
//! One [`TokenBucket`] per caller key, created full on first use and kept
//! for the life of the process. Buckets live in a sharded [`DashMap`] and
//! are mutated under their shard's lock, so callers with different keys
//! rarely contend. Restarting the process resets every bucket.
//!
//! A bucket's rate and capacity are fixed when it is created.

mod bucket;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;
use vigil_core::VigilError;

pub use bucket::TokenBucket;

#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit or reject one request for `key`. An `rpm` of 0 is unlimited.
    pub fn admit(&self, key: &str, rpm: u32, burst: u32) -> bool {
        self.admit_at(key, rpm, burst, Instant::now())
    }

    /// [`admit`](Self::admit) as of `now`.
    pub fn admit_at(&self, key: &str, rpm: u32, burst: u32, now: Instant) -> bool {
        if rpm == 0 {
            return true;
        }
        let admitted = match self.buckets.get_mut(key) {
            Some(mut bucket) => bucket.try_take(now),
            None => self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| TokenBucket::new(rpm, burst, now))
                .try_take(now),
        };
        if !admitted {
            debug!(rpm, burst, "token bucket empty");
        }
        admitted
    }

    /// Like [`admit`](Self::admit), but rejection is `RateLimitExceeded`.
    pub fn check(&self, key: &str, rpm: u32, burst: u32) -> Result<(), VigilError> {
        if self.admit(key, rpm, burst) {
            Ok(())
        } else {
            Err(VigilError::RateLimitExceeded)
        }
    }

    /// Number of keys with a live bucket.
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}
