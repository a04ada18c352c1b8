// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response bodies for the chat completions endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

/// POST /v1/chat.completions request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionsRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Caller-supplied metadata; accepted and ignored.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

/// Policy outcome attached to every successful completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyMetadata {
    pub request_id: String,
    pub tenant: String,
    pub redactions: BTreeMap<String, usize>,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub estimated_cost_usd: f64,
}

/// OpenAI-shaped `chat.completion` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionsResponse {
    pub id: String,
    pub object: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub proxy_metadata: ProxyMetadata,
}

impl ChatCompletionsResponse {
    /// A single-choice completion carrying `content`.
    pub fn single(model: String, content: String, proxy_metadata: ProxyMetadata) -> Self {
        Self {
            id: proxy_metadata.request_id.clone(),
            object: "chat.completion".to_string(),
            model,
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    role: Role::Assistant.as_str().to_string(),
                    content,
                },
                finish_reason: "stop".to_string(),
            }],
            proxy_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_minimal_body() {
        let req: ChatCompletionsRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert!(req.model.is_none());
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, Role::User);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = serde_json::from_str::<ChatCompletionsRequest>(
            r#"{"messages":[{"role":"robot","content":"hi"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("robot"));
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"tool"}"#).unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn single_choice_response_shape() {
        let meta = ProxyMetadata {
            request_id: "abc".into(),
            tenant: "acme".into(),
            redactions: BTreeMap::new(),
            estimated_input_tokens: 3,
            estimated_output_tokens: 16,
            estimated_cost_usd: 0.0,
        };
        let resp = ChatCompletionsResponse::single("m".into(), "hello".into(), meta);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["proxy_metadata"]["tenant"], "acme");
    }
}
