// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vigil_core::VigilError;

use crate::auth::auth_middleware;
use crate::engine::PolicyEngine;
use crate::handlers;

/// Bodies up to this multiple of `max_request_bytes` are read and rejected by
/// the engine (and audited); larger ones are refused by the transport.
const BODY_READ_FACTOR: usize = 4;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<PolicyEngine>,
}

impl GatewayState {
    pub fn new(engine: PolicyEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Build the router: `/health` is public, everything under `/v1` requires a
/// proxy key.
pub fn router(state: GatewayState) -> Router {
    let read_limit = state
        .engine
        .settings()
        .max_request_bytes
        .saturating_mul(BODY_READ_FACTOR);

    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/v1/keys/verify", post(handlers::post_verify_key))
        .route("/v1/usage", get(handlers::get_usage))
        .route("/v1/chat.completions", post(handlers::post_chat_completions))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public_routes
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(read_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `listener` until `shutdown` is cancelled, then drain in-flight
/// requests.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), VigilError> {
    let addr = listener
        .local_addr()
        .map_err(|e| VigilError::Internal(format!("listener has no local address: {e}")))?;
    crate::telemetry::register_metrics();
    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| VigilError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

/// Bind `host:port` and [`serve`].
pub async fn bind_and_serve(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), VigilError> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| VigilError::Internal(format!("failed to bind {addr}: {e}")))?;
    serve(listener, state, shutdown).await
}
