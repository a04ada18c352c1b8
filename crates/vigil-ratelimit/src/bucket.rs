// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Continuous-refill token bucket.

use tokio::time::Instant;

/// A token bucket that refills continuously at `rpm / 60` tokens per second.
///
/// Refill is computed lazily on each [`try_take`](Self::try_take), so no
/// background timer is needed. `available` stays within `[0, capacity]`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    available: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A full bucket holding `burst` tokens.
    pub fn new(rpm: u32, burst: u32, now: Instant) -> Self {
        let capacity = f64::from(burst);
        Self {
            capacity,
            refill_per_sec: f64::from(rpm) / 60.0,
            available: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        // saturating: a clock that steps backwards refills nothing
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.available = (self.available + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Refill, then take one token if at least one is available.
    pub fn try_take(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.available >= 1.0 {
            self.available -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn available(&self) -> f64 {
        self.available
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_full_and_drains() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(60, 3, t0);
        assert!(b.try_take(t0));
        assert!(b.try_take(t0));
        assert!(b.try_take(t0));
        assert!(!b.try_take(t0));
        assert_eq!(b.available(), 0.0);
    }

    #[test]
    fn refills_proportionally_to_elapsed_time() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(60, 2, t0);
        assert!(b.try_take(t0));
        assert!(b.try_take(t0));
        assert!(!b.try_take(t0 + Duration::from_millis(500)));
        assert!(b.try_take(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(600, 5, t0);
        assert!(b.try_take(t0 + Duration::from_secs(3600)));
        assert_eq!(b.available(), 4.0);
        assert!(b.available() <= b.capacity());
    }

    #[test]
    fn zero_burst_never_admits() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(60, 0, t0);
        assert!(!b.try_take(t0 + Duration::from_secs(60)));
    }
}
