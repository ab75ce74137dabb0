// src/provider/resolver.rs — Provider discovery from environment

use std::sync::Arc;

use super::anthropic::AnthropicProvider;
use super::fallback::FallbackChain;
use super::openai::OpenAIProvider;
use super::{ModelProvider, ModelRef};
use crate::infra::config::VerifierConfig;

/// Providers whose API keys are present in the environment.
pub fn providers_from_env() -> Vec<Arc<dyn ModelProvider>> {
    let mut providers: Vec<Arc<dyn ModelProvider>> = Vec::new();

    if let Some(key) = env_key("ANTHROPIC_API_KEY") {
        providers.push(Arc::new(AnthropicProvider::new(key)));
    }
    if let Some(key) = env_key("OPENAI_API_KEY") {
        let provider = match env_key("OPENAI_BASE_URL") {
            Some(url) => OpenAIProvider::with_base_url(key, url),
            None => OpenAIProvider::new(key),
        };
        providers.push(Arc::new(provider));
    }

    providers
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse `[verifier] models`, skipping malformed entries.
pub fn candidates(config: &VerifierConfig) -> Vec<ModelRef> {
    config
        .models
        .iter()
        .filter_map(|m| {
            let parsed = ModelRef::parse(m);
            if parsed.is_none() {
                tracing::warn!("Ignoring verifier model '{}': expected provider/model", m);
            }
            parsed
        })
        .collect()
}

/// Fallback chain for the verifier, or `None` when no candidate is reachable.
pub fn verifier_chain(
    config: &VerifierConfig,
    providers: Vec<Arc<dyn ModelProvider>>,
) -> Option<FallbackChain> {
    let chain = FallbackChain::new(candidates(config), providers);
    chain.is_usable().then_some(chain)
}
