// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy key authentication middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;
use vigil_core::VigilError;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Header carrying the caller's proxy key.
pub const PROXY_KEY_HEADER: &str = "x-proxy-key";

/// Resolve `X-Proxy-Key` to a [`KeyPolicy`](vigil_config::KeyPolicy) and
/// attach it to the request extensions.
///
/// Rejections here are not audited: no tenant is known yet.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = match request.headers().get(PROXY_KEY_HEADER) {
        None => state.engine.authenticate(None),
        Some(value) => match value.to_str() {
            Ok(presented) => state.engine.authenticate(Some(presented)),
            Err(_) => Err(VigilError::AuthenticationInvalid),
        },
    };

    match resolved {
        Ok(policy) => {
            request.extensions_mut().insert(policy);
            next.run(request).await
        }
        Err(e) => {
            warn!(kind = %e.kind(), path = %request.uri().path(), "authentication rejected");
            ApiError::from(e).into_response()
        }
    }
}
