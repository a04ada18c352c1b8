// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Responses API.
//!
//! One POST per call, no retries. Every failure (transport, non-2xx status,
//! undecodable body) becomes `UpstreamUnavailable`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};
use vigil_config::UpstreamConfig;
use vigil_core::{GenerateRequest, UpstreamProvider, VigilError};

use crate::types::{ApiErrorResponse, ResponsesRequest, ResponsesResponse};

const RESPONSES_PATH: &str = "/v1/responses";

fn unavailable(message: impl Into<String>) -> VigilError {
    VigilError::UpstreamUnavailable {
        message: message.into(),
    }
}

/// Upstream provider backed by the Responses API.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, VigilError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| VigilError::Config(format!("invalid upstream API key: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| VigilError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{RESPONSES_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Build from config. `Ok(None)` when no upstream key is configured.
    pub fn from_config(config: &UpstreamConfig) -> Result<Option<Self>, VigilError> {
        match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Self::new(
                key,
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UpstreamProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, VigilError> {
        let body = ResponsesRequest {
            model: &request.model,
            input: &request.prompt,
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                unavailable(format!("request {kind}: {}", e.without_url()))
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "upstream response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_default();
            warn!(status = %status, "upstream returned an error status");
            return Err(if detail.is_empty() {
                unavailable(format!("upstream returned {status}"))
            } else {
                unavailable(format!("upstream returned {status}: {detail}"))
            });
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid upstream response: {}", e.without_url())))?;
        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> OpenAiProvider {
        OpenAiProvider::new("sk-test", base_url, Duration::from_secs(5)).unwrap()
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "gpt-4o-mini".into(),
            prompt: "USER: ping\nASSISTANT:".into(),
            temperature: Some(0.0),
            max_tokens: Some(16),
        }
    }

    #[tokio::test]
    async fn posts_responses_request_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "input": "USER: ping\nASSISTANT:",
                "max_output_tokens": 16
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"output_text": " pong \n"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server.uri()).generate(request()).await.unwrap();
        assert_eq!(text, "pong");
    }

    #[tokio::test]
    async fn error_status_is_unavailable_with_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "server overloaded", "type": "server_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server.uri()).generate(request()).await.unwrap_err();
        match err {
            VigilError::UpstreamUnavailable { message } => {
                assert!(message.contains("500"));
                assert!(message.contains("server overloaded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn no_retry_on_transient_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        assert!(provider(&server.uri()).generate(request()).await.is_err());
    }

    #[tokio::test]
    async fn undecodable_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).generate(request()).await.unwrap_err();
        assert!(matches!(err, VigilError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn timeout_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({"output_text": "late"})),
            )
            .mount(&server)
            .await;

        let p = OpenAiProvider::new("sk-test", &server.uri(), Duration::from_millis(50)).unwrap();
        let err = p.generate(request()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn from_config_without_key_is_none() {
        let cfg = UpstreamConfig::default();
        assert!(OpenAiProvider::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let cfg = UpstreamConfig {
            api_key: Some("sk-x".into()),
            base_url: "http://localhost:9999/".into(),
            ..UpstreamConfig::default()
        };
        let p = OpenAiProvider::from_config(&cfg).unwrap().unwrap();
        assert_eq!(p.endpoint(), "http://localhost:9999/v1/responses");
    }
}
