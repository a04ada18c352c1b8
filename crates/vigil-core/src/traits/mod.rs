// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the policy engine and its external collaborators.

pub mod upstream;

pub use upstream::UpstreamProvider;
