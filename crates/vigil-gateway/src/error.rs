// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`VigilError`] to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use vigil_core::{BudgetKind, ErrorKind, VigilError};

/// HTTP status for a request outcome.
pub fn status_for(err: &VigilError) -> StatusCode {
    match err {
        VigilError::AuthenticationMissing => StatusCode::UNAUTHORIZED,
        VigilError::AuthenticationInvalid => StatusCode::FORBIDDEN,
        VigilError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        VigilError::BudgetExceeded { kind } => match kind {
            BudgetKind::Requests | BudgetKind::Tokens => StatusCode::TOO_MANY_REQUESTS,
            BudgetKind::DailySpend | BudgetKind::MonthlySpend => StatusCode::PAYMENT_REQUIRED,
        },
        VigilError::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        VigilError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        VigilError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        VigilError::UpstreamConfigurationMissing
        | VigilError::Config(_)
        | VigilError::Storage { .. }
        | VigilError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Detail text safe to return to a caller.
///
/// Store and internal failures are reported by kind only.
pub fn public_detail(err: &VigilError) -> String {
    match err {
        VigilError::Storage { .. } => "storage unavailable".to_string(),
        VigilError::Internal(_) | VigilError::Config(_) => "internal error".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub detail: String,
}

/// JSON error body: `{"error":{"kind","detail"},"request_id"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<String>,
}

/// A failed request, optionally tied to the id it was audited under.
#[derive(Debug)]
pub struct ApiError {
    pub request_id: Option<String>,
    pub error: VigilError,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, error: VigilError) -> Self {
        Self {
            request_id: Some(request_id.into()),
            error,
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                kind: self.error.kind(),
                detail: public_detail(&self.error),
            },
            request_id: self.request_id.clone(),
        }
    }
}

impl From<VigilError> for ApiError {
    fn from(error: VigilError) -> Self {
        Self {
            request_id: None,
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
