// src/provider/mod.rs — Model provider layer (used by the AI answer verifier)
//
// The verifier only ever sends one instruction and one question, so the
// request is single-turn rather than a message history.

pub mod anthropic;
pub mod fallback;
pub mod openai;
pub mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::ProviderError;

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Matches the `provider` half of a `provider/model` reference.
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// One system instruction plus one user turn.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Filled in by the fallback chain per candidate.
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Read two counters out of a vendor `usage` object.
    fn from_json(usage: &serde_json::Value, input: &str, output: &str) -> Self {
        let count = |key: &str| usage[key].as_u64().unwrap_or(0) as u32;
        Self {
            input_tokens: count(input),
            output_tokens: count(output),
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// `provider/model`, as written in `[verifier] models`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

impl ModelRef {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().split_once('/') {
            Some((p, m)) if !p.is_empty() && !m.is_empty() => Some(Self::new(p, m)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Send a prepared request and return the JSON body of a 2xx reply.
///
/// Transport timeouts, connection failures and 5xx are retriable; 429 maps
/// to `RateLimited` using `retry-after` (seconds) when the vendor sends it.
async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let failure = |message: String, retriable: bool| ProviderError::Provider {
        provider: provider.to_string(),
        message,
        retriable,
    };

    let response = request
        .send()
        .await
        .map_err(|e| failure(e.to_string(), e.is_timeout() || e.is_connect()))?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after_ms: retry_after_secs * 1000,
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(failure(
            format!("HTTP {status}: {}", truncate(&body, 200)),
            status.is_server_error(),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| failure(format!("unreadable reply: {e}"), false))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
