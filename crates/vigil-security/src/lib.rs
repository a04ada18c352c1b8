// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security primitives for the Vigil policy engine.
//!
//! Provides prompt redaction, prompt fingerprinting, and caller key
//! authentication.

pub mod auth;
pub mod fingerprint;
pub mod redact;

pub use auth::{authenticate, PolicySet};
pub use fingerprint::{fingerprint, FINGERPRINT_HEX_LEN};
pub use redact::{redact, Matcher, RedactionResult, Redactor, RegexMatcher};
