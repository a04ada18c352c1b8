// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger: running totals per (scope, scope key, caller key).
//!
//! Each row is a flat accumulator. Rows are created on first write and only
//! ever incremented. Increments are a single `INSERT ... ON CONFLICT DO
//! UPDATE` statement, so concurrent updates to the same row never lose
//! writes.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_core::{Scope, UsageDelta, UsageTotals, VigilError};
use vigil_storage::{map_tr_err, Database};

const UPSERT_SQL: &str = "INSERT INTO usage (scope, scope_key, api_key, tenant, requests, tokens, usd)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(scope, scope_key, api_key) DO UPDATE SET
         requests = requests + excluded.requests,
         tokens = tokens + excluded.tokens,
         usd = usd + excluded.usd";

/// Totals for one scope, tagged with the scope key they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedUsage {
    /// `YYYY-MM-DD` for days, `YYYY-MM` for months.
    pub key: String,
    #[serde(flatten)]
    pub totals: UsageTotals,
}

/// Current day and month totals for one caller key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub day: ScopedUsage,
    pub month: ScopedUsage,
}

/// Persistent usage accumulator backed by the `usage` table.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    db: Database,
}

fn to_sql_int(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn from_sql_int(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

fn upsert(
    conn: &rusqlite::Connection,
    scope: Scope,
    scope_key: &str,
    api_key: &str,
    tenant: &str,
    delta: UsageDelta,
) -> rusqlite::Result<()> {
    conn.execute(
        UPSERT_SQL,
        params![
            scope.to_string(),
            scope_key,
            api_key,
            tenant,
            to_sql_int(delta.requests),
            to_sql_int(delta.tokens),
            delta.usd,
        ],
    )?;
    Ok(())
}

impl UsageLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (or create) the ledger database at `path`.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VigilError> {
        Ok(Self::new(Database::open(path, wal_mode).await?))
    }

    /// Current totals for a triple. Zeros when no row exists.
    pub async fn get(
        &self,
        scope: Scope,
        scope_key: &str,
        api_key: &str,
    ) -> Result<UsageTotals, VigilError> {
        let scope = scope.to_string();
        let scope_key = scope_key.to_string();
        let api_key = api_key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT requests, tokens, usd FROM usage
                     WHERE scope = ?1 AND scope_key = ?2 AND api_key = ?3",
                )?;
                let totals = stmt
                    .query_row(params![scope, scope_key, api_key], |row| {
                        Ok(UsageTotals {
                            requests: from_sql_int(row.get(0)?),
                            tokens: from_sql_int(row.get(1)?),
                            usd: row.get(2)?,
                        })
                    })
                    .optional()?;
                Ok(totals.unwrap_or_default())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Add `delta` to one triple, inserting the row if absent.
    pub async fn add(
        &self,
        scope: Scope,
        scope_key: &str,
        api_key: &str,
        tenant: &str,
        delta: UsageDelta,
    ) -> Result<(), VigilError> {
        let scope_key = scope_key.to_string();
        let api_key = api_key.to_string();
        let tenant = tenant.to_string();
        self.db
            .connection()
            .call(move |conn| upsert(conn, scope, &scope_key, &api_key, &tenant, delta))
            .await
            .map_err(map_tr_err)
    }

    /// Charge `delta` to the current UTC day and month.
    pub async fn charge(
        &self,
        api_key: &str,
        tenant: &str,
        delta: UsageDelta,
    ) -> Result<(), VigilError> {
        self.charge_at(api_key, tenant, delta, Utc::now()).await
    }

    /// Charge `delta` to the day and month containing `at`.
    ///
    /// Both rows are written in one transaction so day and month coverage
    /// never diverge.
    pub async fn charge_at(
        &self,
        api_key: &str,
        tenant: &str,
        delta: UsageDelta,
        at: DateTime<Utc>,
    ) -> Result<(), VigilError> {
        let day_key = Scope::Day.key_at(at);
        let month_key = Scope::Month.key_at(at);
        let owned_key = api_key.to_string();
        let owned_tenant = tenant.to_string();

        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                upsert(&tx, Scope::Day, &day_key, &owned_key, &owned_tenant, delta)?;
                upsert(&tx, Scope::Month, &month_key, &owned_key, &owned_tenant, delta)?;
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        info!(
            tenant,
            requests = delta.requests,
            tokens = delta.tokens,
            usd = delta.usd,
            "usage charged"
        );
        Ok(())
    }

    /// Day and month totals for `api_key` as of now.
    pub async fn snapshot(&self, api_key: &str) -> Result<UsageSnapshot, VigilError> {
        self.snapshot_at(api_key, Utc::now()).await
    }

    pub async fn snapshot_at(
        &self,
        api_key: &str,
        at: DateTime<Utc>,
    ) -> Result<UsageSnapshot, VigilError> {
        let day_key = Scope::Day.key_at(at);
        let month_key = Scope::Month.key_at(at);
        let day = self.get(Scope::Day, &day_key, api_key).await?;
        let month = self.get(Scope::Month, &month_key, api_key).await?;
        Ok(UsageSnapshot {
            day: ScopedUsage {
                key: day_key,
                totals: day,
            },
            month: ScopedUsage {
                key: month_key,
                totals: month,
            },
        })
    }
}
