// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage accounting for the Vigil policy engine.
//!
//! This crate provides:
//! - **Usage ledger**: durable day and month running totals per caller key
//! - **Budget enforcer**: request, token and spend caps checked before the upstream call
//! - **Pricing**: character-based token estimates and per-1k cost estimates

pub mod budget;
pub mod ledger;
pub mod pricing;

pub use budget::BudgetEnforcer;
pub use ledger::{ScopedUsage, UsageLedger, UsageSnapshot};
pub use pricing::{estimate_cost_usd, estimate_tokens, UsageEstimate};
