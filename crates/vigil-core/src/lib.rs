// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vigil policy engine.
//!
//! Holds the error taxonomy every request outcome is expressed in, the usage
//! types shared by the ledger and budget enforcer, and the trait through which
//! the upstream text-generation API is invoked.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BudgetKind, ErrorKind, VigilError};
pub use traits::UpstreamProvider;
pub use types::{GenerateRequest, Scope, UsageDelta, UsageTotals};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl UpstreamProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: GenerateRequest) -> Result<String, VigilError> {
            Ok(request.prompt)
        }
    }

    #[tokio::test]
    async fn upstream_provider_is_object_safe() {
        let provider: Box<dyn UpstreamProvider> = Box::new(Echo);
        let out = provider
            .generate(GenerateRequest {
                model: "m".into(),
                prompt: "hello".into(),
                temperature: None,
                max_tokens: None,
            })
            .await
            .unwrap();
        assert_eq!(out, "hello");
        assert_eq!(provider.name(), "echo");
    }
}
