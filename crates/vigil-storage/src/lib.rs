// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Vigil policy engine.
//!
//! WAL-mode SQLite with embedded refinery migrations and a single-writer
//! model via `tokio-rusqlite`. The schema holds one table, `usage`, with
//! running totals per (scope, scope key, caller key).

pub mod database;
pub mod migrations;

pub use database::{map_tr_err, Database};
