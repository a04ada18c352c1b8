// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock upstream provider for deterministic testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vigil_core::{GenerateRequest, UpstreamProvider, VigilError};

/// An upstream that replays scripted outcomes and records every request.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty the
/// provider answers `"mock response"`.
pub struct MockUpstream {
    outcomes: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider pre-loaded with successful replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            outcomes: Mutex::new(replies.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure surfaced as `UpstreamUnavailable`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.outcomes.lock().await.push_back(Err(message.into()));
    }

    pub async fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamProvider for MockUpstream {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, VigilError> {
        self.calls.lock().await.push(request);
        match self.outcomes.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(VigilError::UpstreamUnavailable { message }),
            None => Ok("mock response".to_string()),
        }
    }
}
