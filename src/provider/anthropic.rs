// src/provider/anthropic.rs — Anthropic Messages API

use async_trait::async_trait;
use serde_json::json;

use super::{send_json, ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::ProviderError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn body(request: &ChatRequest) -> serde_json::Value {
        // max_tokens is mandatory here.
        let mut body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens.unwrap_or(16),
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        if let Some(t) = request.temperature {
            body["temperature"] = json!(t);
        }
        body
    }

    /// Concatenate the text blocks of a reply.
    fn text_of(reply: &serde_json::Value) -> String {
        reply["content"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect()
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let http = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&Self::body(&request));
        let reply = send_json(self.id(), http).await?;

        Ok(ChatResponse {
            content: Self::text_of(&reply),
            usage: TokenUsage::from_json(&reply["usage"], "input_tokens", "output_tokens"),
        })
    }
}
