// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Uri;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use vigil_config::KeyPolicy;
use vigil_cost::UsageSnapshot;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::types::ChatCompletionsResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyKeyResponse {
    pub ok: bool,
    pub tenant: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /v1/keys/verify
pub async fn post_verify_key(
    Extension(policy): Extension<Arc<KeyPolicy>>,
) -> Json<VerifyKeyResponse> {
    Json(VerifyKeyResponse {
        ok: true,
        tenant: policy.tenant.clone(),
    })
}

/// GET /v1/usage
///
/// Current day and month totals for the calling key.
pub async fn get_usage(
    State(state): State<GatewayState>,
    Extension(policy): Extension<Arc<KeyPolicy>>,
) -> Result<Json<UsageSnapshot>, ApiError> {
    let snapshot = state.engine.usage(&policy).await?;
    Ok(Json(snapshot))
}

/// POST /v1/chat.completions
///
/// The raw body goes to the engine unparsed so that oversized and malformed
/// requests are audited like any other outcome.
pub async fn post_chat_completions(
    State(state): State<GatewayState>,
    Extension(policy): Extension<Arc<KeyPolicy>>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<ChatCompletionsResponse>, ApiError> {
    let response = state
        .engine
        .handle_chat(policy, uri.path().to_string(), body)
        .await?;
    Ok(Json(response))
}
