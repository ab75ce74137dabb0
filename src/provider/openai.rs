// src/provider/openai.rs — OpenAI-compatible chat completions

use async_trait::async_trait;
use serde_json::json;

use super::{send_json, ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Also serves any `/chat/completions` endpoint via `OPENAI_BASE_URL`.
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.into())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body(request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let mut body = json!({ "model": request.model, "messages": messages });
        if let Some(n) = request.max_tokens {
            body["max_tokens"] = json!(n);
        }
        if let Some(t) = request.temperature {
            body["temperature"] = json!(t);
        }
        body
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let http = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&Self::body(&request));
        let reply = send_json(self.id(), http).await?;

        Ok(ChatResponse {
            content: reply["choices"][0]["message"]["content"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            usage: TokenUsage::from_json(&reply["usage"], "prompt_tokens", "completion_tokens"),
        })
    }
}
