// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy engine and HTTP surface for the Vigil proxy.
//!
//! [`PolicyEngine`] composes authentication, rate limiting, redaction,
//! budgets, the upstream call and auditing for one request. The axum router
//! in [`server`] is a thin shell over it.

pub mod auth;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod telemetry;
pub mod prompt;
pub mod server;
pub mod types;

pub use auth::PROXY_KEY_HEADER;
pub use engine::{EngineSettings, PolicyEngine};
pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use prompt::build_prompt;
pub use server::{bind_and_serve, router, serve, GatewayState};
pub use types::{ChatCompletionsRequest, ChatCompletionsResponse, ChatMessage, Role};
