// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget enforcement against a caller's day and month usage.
//!
//! The check reads the ledger and the charge is written later, after the
//! upstream call. The two are not one transaction: concurrent requests from
//! the same caller can each pass the check before any of them is charged,
//! so a budget may be overshot by at most the number of that caller's
//! in-flight requests. This is accepted.

use chrono::{DateTime, Utc};
use tracing::warn;
use vigil_config::KeyPolicy;
use vigil_core::{BudgetKind, Scope, UsageDelta, VigilError};

use crate::ledger::UsageLedger;

/// Fraction of a USD cap at which a warning is logged.
const WARN_FRACTION: f64 = 0.8;

/// Checks prospective usage against a [`KeyPolicy`]'s caps.
#[derive(Debug, Clone)]
pub struct BudgetEnforcer {
    ledger: UsageLedger,
}

impl BudgetEnforcer {
    pub fn new(ledger: UsageLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Admit or reject `delta` for `policy.key` as of now.
    pub async fn enforce(&self, policy: &KeyPolicy, delta: UsageDelta) -> Result<(), VigilError> {
        self.enforce_at(policy, delta, Utc::now()).await
    }

    /// Admit or reject `delta` against the day and month containing `at`.
    ///
    /// Checks run in order (daily requests, daily tokens, daily spend,
    /// monthly spend) and the first failure wins. USD caps of 0 are
    /// disabled; request and token caps always apply. Nothing is written.
    pub async fn enforce_at(
        &self,
        policy: &KeyPolicy,
        delta: UsageDelta,
        at: DateTime<Utc>,
    ) -> Result<(), VigilError> {
        let day = self
            .ledger
            .get(Scope::Day, &Scope::Day.key_at(at), &policy.key)
            .await?;
        let month = self
            .ledger
            .get(Scope::Month, &Scope::Month.key_at(at), &policy.key)
            .await?;

        let rejected = if day.requests.saturating_add(delta.requests) > policy.max_requests_per_day
        {
            Some(BudgetKind::Requests)
        } else if day.tokens.saturating_add(delta.tokens) > policy.max_tokens_per_day {
            Some(BudgetKind::Tokens)
        } else if policy.max_usd_per_day > 0.0 && day.usd + delta.usd > policy.max_usd_per_day {
            Some(BudgetKind::DailySpend)
        } else if policy.max_usd_per_month > 0.0
            && month.usd + delta.usd > policy.max_usd_per_month
        {
            Some(BudgetKind::MonthlySpend)
        } else {
            None
        };

        if let Some(kind) = rejected {
            warn!(
                tenant = %policy.tenant,
                key_prefix = policy.key_prefix(),
                budget = %kind,
                "budget exceeded"
            );
            return Err(VigilError::BudgetExceeded { kind });
        }

        let day_usd = day.usd + delta.usd;
        if policy.max_usd_per_day > 0.0 && day_usd >= policy.max_usd_per_day * WARN_FRACTION {
            warn!(
                tenant = %policy.tenant,
                daily_usd = day_usd,
                daily_cap = policy.max_usd_per_day,
                "approaching daily spend cap (80%+)"
            );
        }
        let month_usd = month.usd + delta.usd;
        if policy.max_usd_per_month > 0.0
            && month_usd >= policy.max_usd_per_month * WARN_FRACTION
        {
            warn!(
                tenant = %policy.tenant,
                monthly_usd = month_usd,
                monthly_cap = policy.max_usd_per_month,
                "approaching monthly spend cap (80%+)"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vigil_storage::Database;

    fn policy() -> KeyPolicy {
        KeyPolicy {
            key: "budget-key".into(),
            tenant: "acme".into(),
            rpm: 0,
            burst: 1,
            max_requests_per_day: 1000,
            max_tokens_per_day: 1_000_000,
            max_usd_per_day: 0.0,
            max_usd_per_month: 0.0,
        }
    }

    async fn enforcer() -> BudgetEnforcer {
        BudgetEnforcer::new(UsageLedger::new(Database::open_in_memory().await.unwrap()))
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap()
    }

    fn kind_of(result: Result<(), VigilError>) -> Option<BudgetKind> {
        match result {
            Err(VigilError::BudgetExceeded { kind }) => Some(kind),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => None,
        }
    }

    #[tokio::test]
    async fn fourth_request_over_cap_is_rejected_without_charge() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_requests_per_day: 3,
            ..policy()
        };
        let delta = UsageDelta::single_request(1, 0.0);

        for _ in 0..3 {
            e.enforce_at(&p, delta, at()).await.unwrap();
            e.ledger().charge_at(&p.key, &p.tenant, delta, at()).await.unwrap();
        }
        assert_eq!(
            kind_of(e.enforce_at(&p, delta, at()).await),
            Some(BudgetKind::Requests)
        );
        let snap = e.ledger().snapshot_at(&p.key, at()).await.unwrap();
        assert_eq!(snap.day.totals.requests, 3);
    }

    #[tokio::test]
    async fn token_cap_applies_to_prospective_total() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_tokens_per_day: 1000,
            ..policy()
        };
        e.ledger()
            .charge_at(&p.key, &p.tenant, UsageDelta::single_request(900, 0.0), at())
            .await
            .unwrap();

        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(100, 0.0), at()).await),
            None
        );
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(101, 0.0), at()).await),
            Some(BudgetKind::Tokens)
        );
    }

    #[tokio::test]
    async fn zero_usd_caps_are_disabled() {
        let e = enforcer().await;
        let p = policy();
        let delta = UsageDelta::single_request(1, 1_000.0);
        assert_eq!(kind_of(e.enforce_at(&p, delta, at()).await), None);
    }

    #[tokio::test]
    async fn zero_request_cap_admits_nothing() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_requests_per_day: 0,
            ..policy()
        };
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(1, 0.0), at()).await),
            Some(BudgetKind::Requests)
        );
    }

    #[tokio::test]
    async fn daily_spend_then_monthly_spend() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_usd_per_day: 1.0,
            max_usd_per_month: 1.5,
            ..policy()
        };
        let earlier = Utc.with_ymd_and_hms(2025, 5, 19, 10, 0, 0).unwrap();
        e.ledger()
            .charge_at(&p.key, &p.tenant, UsageDelta::single_request(1, 0.9), earlier)
            .await
            .unwrap();

        // Day is fresh, but the month already holds 0.9.
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(1, 0.7), at()).await),
            Some(BudgetKind::MonthlySpend)
        );
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(1, 1.1), at()).await),
            Some(BudgetKind::DailySpend)
        );
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(1, 0.5), at()).await),
            None
        );
    }

    #[tokio::test]
    async fn first_failing_check_wins() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_requests_per_day: 0,
            max_tokens_per_day: 0,
            max_usd_per_day: 0.01,
            max_usd_per_month: 0.01,
            ..policy()
        };
        assert_eq!(
            kind_of(e.enforce_at(&p, UsageDelta::single_request(5, 5.0), at()).await),
            Some(BudgetKind::Requests)
        );
    }

    #[tokio::test]
    async fn previous_day_usage_does_not_count_today() {
        let e = enforcer().await;
        let p = KeyPolicy {
            max_requests_per_day: 1,
            ..policy()
        };
        let yesterday = Utc.with_ymd_and_hms(2025, 5, 19, 23, 59, 59).unwrap();
        let delta = UsageDelta::single_request(1, 0.0);
        e.ledger().charge_at(&p.key, &p.tenant, delta, yesterday).await.unwrap();
        assert_eq!(kind_of(e.enforce_at(&p, delta, at()).await), None);
    }
}
