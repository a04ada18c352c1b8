// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upstream text-generation collaborator.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::GenerateRequest;

/// A third-party text-generation API.
///
/// Implementations must surface every transport or protocol failure as
/// [`VigilError::UpstreamUnavailable`]; they never panic past this boundary.
#[async_trait]
pub trait UpstreamProvider: Send + Sync + 'static {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Generate text for the given prompt.
    async fn generate(&self, request: GenerateRequest) -> Result<String, VigilError>;
}
