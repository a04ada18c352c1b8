// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI upstream provider for the Vigil policy engine.
//!
//! Implements [`vigil_core::UpstreamProvider`] over the Responses API.

pub mod client;
pub mod types;

pub use client::OpenAiProvider;
