// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vigil policy engine.
//!
//! Every request outcome other than success is one of these variants. The
//! machine-readable [`ErrorKind`] is stable across releases; the `Display`
//! text is the human-readable detail.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Which budget dimension rejected a prospective charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    /// Daily request count cap.
    Requests,
    /// Daily token cap.
    Tokens,
    /// Daily USD spend cap.
    DailySpend,
    /// Monthly USD spend cap.
    MonthlySpend,
}

/// Stable, machine-readable classification of a [`VigilError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthenticationMissing,
    AuthenticationInvalid,
    RateLimitExceeded,
    BudgetExceededRequests,
    BudgetExceededTokens,
    BudgetExceededDailySpend,
    BudgetExceededMonthlySpend,
    RequestTooLarge,
    InvalidRequest,
    UpstreamUnavailable,
    UpstreamConfigurationMissing,
    Config,
    Storage,
    Internal,
}

/// The primary error type shared by every Vigil crate.
#[derive(Debug, Error)]
pub enum VigilError {
    /// No credential was presented.
    #[error("missing proxy key")]
    AuthenticationMissing,

    /// The presented credential is not in the loaded policy set.
    #[error("invalid proxy key")]
    AuthenticationInvalid,

    /// The caller's token bucket is empty.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// A day or month budget would be exceeded by this request.
    #[error("{}", budget_detail(*kind))]
    BudgetExceeded { kind: BudgetKind },

    /// The raw request body is larger than the configured limit.
    #[error("request too large: {size} bytes exceeds limit of {limit} bytes")]
    RequestTooLarge { size: usize, limit: usize },

    /// The request body could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream text-generation call failed.
    #[error("upstream_error: {message}")]
    UpstreamUnavailable { message: String },

    /// No upstream credential is configured.
    #[error("upstream API key not configured")]
    UpstreamConfigurationMissing,

    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistent store errors (usage database or audit sink).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn budget_detail(kind: BudgetKind) -> &'static str {
    match kind {
        BudgetKind::Requests => "daily request cap exceeded",
        BudgetKind::Tokens => "daily token cap exceeded",
        BudgetKind::DailySpend => "daily spend cap exceeded",
        BudgetKind::MonthlySpend => "monthly spend cap exceeded",
    }
}

impl VigilError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Stable machine-readable kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationMissing => ErrorKind::AuthenticationMissing,
            Self::AuthenticationInvalid => ErrorKind::AuthenticationInvalid,
            Self::RateLimitExceeded => ErrorKind::RateLimitExceeded,
            Self::BudgetExceeded { kind } => match kind {
                BudgetKind::Requests => ErrorKind::BudgetExceededRequests,
                BudgetKind::Tokens => ErrorKind::BudgetExceededTokens,
                BudgetKind::DailySpend => ErrorKind::BudgetExceededDailySpend,
                BudgetKind::MonthlySpend => ErrorKind::BudgetExceededMonthlySpend,
            },
            Self::RequestTooLarge { .. } => ErrorKind::RequestTooLarge,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamConfigurationMissing => ErrorKind::UpstreamConfigurationMissing,
            Self::Config(_) => ErrorKind::Config,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
