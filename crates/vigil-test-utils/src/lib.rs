// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vigil integration tests.
//!
//! # Components
//!
//! - [`MockUpstream`] - scripted upstream provider that records its calls
//! - [`fixtures`] - key policies and chat bodies
//! - [`TestHarness`] - a complete policy engine over temp storage

pub mod fixtures;
pub mod harness;
pub mod mock_upstream;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_upstream::MockUpstream;
