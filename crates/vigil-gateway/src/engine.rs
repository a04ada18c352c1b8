// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-request policy pipeline.
//!
//! `PolicyEngine` owns every piece of process-scoped state (policy set, token
//! buckets, ledger, audit sink, upstream client) and runs one authenticated
//! chat request through rate limit, size check, redaction, fingerprinting,
//! budget check, upstream call and charge. Exactly one audit event is written
//! per request, whatever the outcome.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use tracing::{info, warn};
use vigil_audit::{new_request_id, AuditEvent, AuditLogger, RequestSnapshot};
use vigil_config::{KeyPolicy, PricingConfig, VigilConfig};
use vigil_core::{GenerateRequest, UpstreamProvider, VigilError};
use vigil_cost::{BudgetEnforcer, UsageEstimate, UsageLedger, UsageSnapshot};
use vigil_openai::OpenAiProvider;
use vigil_ratelimit::RateLimiter;
use vigil_security::{authenticate, fingerprint, PolicySet, Redactor};

use crate::error::{status_for, ApiError};
use crate::prompt::build_prompt;
use crate::telemetry::{record_latency, record_request, record_tokens};
use crate::types::{ChatCompletionsRequest, ChatCompletionsResponse, ProxyMetadata};

/// Request-path settings extracted from [`VigilConfig`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_request_bytes: usize,
    pub default_model: String,
    pub default_max_tokens: u32,
    pub store_raw: bool,
    pub redact_emails_phones: bool,
    pub pricing: PricingConfig,
}

impl EngineSettings {
    pub fn from_config(config: &VigilConfig) -> Self {
        Self {
            max_request_bytes: config.server.max_request_bytes,
            default_model: config.upstream.default_model.clone(),
            default_max_tokens: config.upstream.default_max_tokens,
            store_raw: config.audit.store_raw,
            redact_emails_phones: config.redaction.redact_emails_phones,
            pricing: config.pricing.clone(),
        }
    }
}

pub struct PolicyEngine {
    settings: EngineSettings,
    policies: PolicySet,
    limiter: RateLimiter,
    redactor: Redactor,
    budget: BudgetEnforcer,
    audit: Arc<AuditLogger>,
    upstream: Option<Arc<dyn UpstreamProvider>>,
}

impl PolicyEngine {
    pub fn new(
        settings: EngineSettings,
        policies: PolicySet,
        ledger: UsageLedger,
        audit: AuditLogger,
        upstream: Option<Arc<dyn UpstreamProvider>>,
    ) -> Self {
        let redactor = Redactor::new(settings.redact_emails_phones);
        Self {
            settings,
            policies,
            limiter: RateLimiter::new(),
            redactor,
            budget: BudgetEnforcer::new(ledger),
            audit: Arc::new(audit),
            upstream,
        }
    }

    /// Open the ledger and audit sink named in `config` and build the
    /// upstream client if a credential is configured.
    pub async fn from_config(config: &VigilConfig) -> Result<Self, VigilError> {
        let policies = PolicySet::new(config.keys.iter().cloned())?;
        let ledger =
            UsageLedger::open(&config.storage.database_path, config.storage.wal_mode).await?;
        let audit = AuditLogger::new(&config.audit.log_path);
        let upstream = match OpenAiProvider::from_config(&config.upstream)? {
            Some(provider) => Some(Arc::new(provider) as Arc<dyn UpstreamProvider>),
            None => {
                warn!("upstream API key not configured; chat requests will fail");
                None
            }
        };
        info!(
            keys = policies.len(),
            tenants = policies.tenants().len(),
            database = %config.storage.database_path,
            audit_log = %config.audit.log_path,
            "policy engine ready"
        );
        Ok(Self::new(
            EngineSettings::from_config(config),
            policies,
            ledger,
            audit,
            upstream,
        ))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &UsageLedger {
        self.budget.ledger()
    }

    /// Resolve the presented proxy key to its policy.
    pub fn authenticate(&self, presented: Option<&str>) -> Result<Arc<KeyPolicy>, VigilError> {
        authenticate(&self.policies, presented)
    }

    pub async fn usage(&self, policy: &KeyPolicy) -> Result<UsageSnapshot, VigilError> {
        self.ledger().snapshot(&policy.key).await
    }

    /// Run a chat request on its own task.
    ///
    /// The charge and the audit write complete even if the caller drops the
    /// returned future.
    pub async fn handle_chat(
        self: &Arc<Self>,
        policy: Arc<KeyPolicy>,
        path: String,
        body: Bytes,
    ) -> Result<ChatCompletionsResponse, ApiError> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.process_chat(&policy, &path, &body).await })
            .await
            .map_err(|e| ApiError::from(VigilError::Internal(format!("request task failed: {e}"))))?
    }

    /// Run a chat request on the current task and audit the outcome.
    pub async fn process_chat(
        &self,
        policy: &KeyPolicy,
        path: &str,
        body: &[u8],
    ) -> Result<ChatCompletionsResponse, ApiError> {
        let started = Instant::now();
        let request_id = new_request_id();
        let mut event = AuditEvent::new(&request_id, &policy.tenant, policy.key_prefix(), path);

        let outcome = self.run(policy, body, &request_id, &mut event).await;

        let elapsed = started.elapsed();
        event.latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        record_latency(elapsed.as_secs_f64());
        match &outcome {
            Ok(_) => {
                record_request(&policy.tenant, "ok");
                info!(
                    request_id = %request_id,
                    tenant = %policy.tenant,
                    caller_key_prefix = %policy.key_prefix(),
                    latency_ms = event.latency_ms,
                    estimated_cost_usd = event.estimated_cost_usd,
                    "chat request completed"
                );
            }
            Err(e) => {
                record_request(&policy.tenant, &e.kind().to_string());
                event.status_code = status_for(e).as_u16();
                event.error_kind = Some(e.kind());
                event.error = Some(e.to_string());
                warn!(
                    request_id = %request_id,
                    tenant = %policy.tenant,
                    caller_key_prefix = %policy.key_prefix(),
                    kind = %e.kind(),
                    status = event.status_code,
                    "chat request failed"
                );
            }
        }

        self.audit
            .write_async(event)
            .await
            .map_err(|e| ApiError::new(&request_id, e))?;

        outcome.map_err(|e| ApiError::new(request_id, e))
    }

    async fn run(
        &self,
        policy: &KeyPolicy,
        body: &[u8],
        request_id: &str,
        event: &mut AuditEvent,
    ) -> Result<ChatCompletionsResponse, VigilError> {
        // Every audited attempt spends a token, including malformed ones.
        self.limiter.check(&policy.key, policy.rpm, policy.burst)?;

        let limit = self.settings.max_request_bytes;
        if body.len() > limit {
            return Err(VigilError::RequestTooLarge {
                size: body.len(),
                limit,
            });
        }

        let request: ChatCompletionsRequest = serde_json::from_slice(body)
            .map_err(|e| VigilError::InvalidRequest(e.to_string()))?;

        let raw_prompt = build_prompt(&request.messages);
        let redaction = self.redactor.redact(&raw_prompt);
        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_model.clone());
        let max_output_tokens = request
            .max_tokens
            .filter(|&n| n > 0)
            .unwrap_or(self.settings.default_max_tokens);
        let estimate =
            UsageEstimate::for_prompt(&self.settings.pricing, &redaction.text, max_output_tokens);

        event.redaction_counts = redaction.counts.clone();
        event.estimated_input_tokens = estimate.input_tokens;
        event.estimated_output_tokens = estimate.output_tokens;
        event.estimated_cost_usd = estimate.cost_usd;
        event.prompt_fingerprint = Some(fingerprint(&redaction.text));
        event.request = Some(RequestSnapshot::select(
            self.settings.store_raw,
            &model,
            &raw_prompt,
            &redaction.text,
        ));

        let delta = estimate.to_delta();
        self.budget.enforce(policy, delta).await?;

        let upstream = self
            .upstream
            .as_ref()
            .ok_or(VigilError::UpstreamConfigurationMissing)?;

        let generated = upstream
            .generate(GenerateRequest {
                model: model.clone(),
                prompt: redaction.text,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            })
            .await;

        // Failed upstream calls still consume quota.
        self.budget
            .ledger()
            .charge(&policy.key, &policy.tenant, delta)
            .await?;

        record_tokens(&policy.tenant, delta.tokens);

        let content = generated?;
        Ok(ChatCompletionsResponse::single(
            model,
            content,
            ProxyMetadata {
                request_id: request_id.to_string(),
                tenant: policy.tenant.clone(),
                redactions: redaction.counts,
                estimated_input_tokens: estimate.input_tokens,
                estimated_output_tokens: estimate.output_tokens,
                estimated_cost_usd: estimate.cost_usd,
            },
        ))
    }
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("keys", &self.policies.len())
            .field("tracked_buckets", &self.limiter.tracked_keys())
            .field("upstream", &self.upstream.as_ref().map(|u| u.name().to_string()))
            .finish_non_exhaustive()
    }
}
