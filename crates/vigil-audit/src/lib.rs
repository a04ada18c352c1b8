// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail for the Vigil policy engine.
//!
//! Every authenticated request attempt produces one [`AuditEvent`], appended
//! as a JSON line to a file chosen by the event's own UTC day.

pub mod event;
pub mod logger;

pub use event::{new_request_id, now_ms, AuditEvent, RequestSnapshot, RequestSummary};
pub use logger::{partition_path, AuditLogger};
