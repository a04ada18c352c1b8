// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end gateway tests.
//!
//! `TestHarness` assembles a complete [`PolicyEngine`] over a temp SQLite
//! database and a temp audit directory, with a [`MockUpstream`] standing in
//! for the real provider.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use vigil_audit::{AuditEvent, AuditLogger};
use vigil_config::{KeyPolicy, PricingConfig, VigilConfig};
use vigil_core::{UpstreamProvider, VigilError};
use vigil_cost::UsageLedger;
use vigil_gateway::{router, EngineSettings, GatewayState, PolicyEngine};
use vigil_security::PolicySet;

use crate::fixtures;
use crate::mock_upstream::MockUpstream;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    policies: Vec<KeyPolicy>,
    replies: Vec<String>,
    with_upstream: bool,
    settings: EngineSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            policies: Vec::new(),
            replies: Vec::new(),
            with_upstream: true,
            settings: EngineSettings::from_config(&VigilConfig::default()),
        }
    }

    /// Add a key policy. Without any, [`fixtures::default_policy`] is used.
    pub fn with_policy(mut self, policy: KeyPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Leave the upstream unconfigured.
    pub fn without_upstream(mut self) -> Self {
        self.with_upstream = false;
        self
    }

    pub fn with_store_raw(mut self, store_raw: bool) -> Self {
        self.settings.store_raw = store_raw;
        self
    }

    pub fn with_redact_emails_phones(mut self, enabled: bool) -> Self {
        self.settings.redact_emails_phones = enabled;
        self
    }

    pub fn with_max_request_bytes(mut self, limit: usize) -> Self {
        self.settings.max_request_bytes = limit;
        self
    }

    pub fn with_pricing(mut self, input_per_1k_usd: f64, output_per_1k_usd: f64) -> Self {
        self.settings.pricing = PricingConfig {
            input_per_1k_usd,
            output_per_1k_usd,
        };
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.settings.default_max_tokens = max_tokens;
        self
    }

    pub async fn build(self) -> Result<TestHarness, VigilError> {
        let temp_dir = tempfile::TempDir::new().map_err(VigilError::storage)?;
        let db_path = temp_dir.path().join("usage.sqlite");
        let audit_base = temp_dir.path().join("audit").join("audit.jsonl");

        let policies = if self.policies.is_empty() {
            vec![fixtures::default_policy()]
        } else {
            self.policies
        };
        let policy_set = PolicySet::new(policies)?;

        let ledger = UsageLedger::open(&db_path.to_string_lossy(), true).await?;
        let upstream = Arc::new(MockUpstream::with_replies(self.replies));
        let provider = self
            .with_upstream
            .then(|| Arc::clone(&upstream) as Arc<dyn UpstreamProvider>);

        let engine = PolicyEngine::new(
            self.settings,
            policy_set,
            ledger,
            AuditLogger::new(&audit_base),
            provider,
        );

        Ok(TestHarness {
            state: GatewayState::new(engine),
            upstream,
            audit_base,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine and router over temp storage.
pub struct TestHarness {
    state: GatewayState,
    upstream: Arc<MockUpstream>,
    audit_base: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, VigilError> {
        Self::builder().build().await
    }

    pub fn engine(&self) -> &Arc<PolicyEngine> {
        &self.state.engine
    }

    pub fn state(&self) -> GatewayState {
        self.state.clone()
    }

    /// A fresh router over the shared engine.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub fn upstream(&self) -> &MockUpstream {
        &self.upstream
    }

    pub fn ledger(&self) -> &UsageLedger {
        self.state.engine.ledger()
    }

    pub fn audit_dir(&self) -> &Path {
        self.audit_base.parent().unwrap_or(Path::new("."))
    }

    /// Every audit event written so far, partitions in date order and lines
    /// in write order.
    pub fn audit_events(&self) -> Result<Vec<AuditEvent>, VigilError> {
        let dir = self.audit_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut partitions: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(VigilError::storage)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        partitions.sort();

        let mut events = Vec::new();
        for path in partitions {
            let content = std::fs::read_to_string(&path).map_err(VigilError::storage)?;
            for line in content.lines().filter(|l| !l.is_empty()) {
                let event: AuditEvent = serde_json::from_str(line)
                    .map_err(|e| VigilError::Internal(format!("bad audit line: {e}")))?;
                events.push(event);
            }
        }
        Ok(events)
    }
}
