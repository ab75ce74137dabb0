// src/provider/fallback.rs — Fallback chain for provider resilience

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{ChatRequest, ChatResponse, ModelProvider, ModelRef};
use crate::infra::errors::ProviderError;

/// Ordered model candidates. A candidate that fails with a retriable error
/// is skipped for `cooldown_duration` and the next one is tried.
pub struct FallbackChain {
    candidates: Vec<ModelRef>,
    providers: Vec<Arc<dyn ModelProvider>>,
    cooldowns: Mutex<HashMap<String, Instant>>,
    cooldown_duration: Duration,
}

impl FallbackChain {
    pub fn new(candidates: Vec<ModelRef>, providers: Vec<Arc<dyn ModelProvider>>) -> Self {
        Self {
            candidates,
            providers,
            cooldowns: Mutex::new(HashMap::new()),
            cooldown_duration: Duration::from_secs(60),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_duration = cooldown;
        self
    }

    /// True when at least one candidate has a matching provider.
    pub fn is_usable(&self) -> bool {
        self.candidates
            .iter()
            .any(|c| self.provider_for(c).is_some())
    }

    fn provider_for(&self, candidate: &ModelRef) -> Option<&Arc<dyn ModelProvider>> {
        self.providers.iter().find(|p| p.id() == candidate.provider)
    }

    fn is_cooled_down(&self, candidate: &ModelRef) -> bool {
        let cooldowns = self.cooldowns.lock().unwrap_or_else(|e| e.into_inner());
        cooldowns
            .get(&candidate.to_string())
            .is_some_and(|start| start.elapsed() < self.cooldown_duration)
    }

    /// Mark a candidate as temporarily unavailable.
    pub fn mark_failed(&self, candidate: &ModelRef) {
        let mut cooldowns = self.cooldowns.lock().unwrap_or_else(|e| e.into_inner());
        cooldowns.insert(candidate.to_string(), Instant::now());
    }

    /// Run a chat request through the fallback chain.
    pub async fn chat(&self, mut request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        if !self.is_usable() {
            return Err(ProviderError::NoProvider);
        }

        for candidate in &self.candidates {
            if self.is_cooled_down(candidate) {
                continue;
            }
            let Some(provider) = self.provider_for(candidate) else {
                continue;
            };

            request.model = candidate.model.clone();
            match provider.chat(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retriable() => {
                    tracing::warn!(
                        provider = %candidate.provider,
                        model = %candidate.model,
                        "Provider failed, trying fallback: {}",
                        e
                    );
                    self.mark_failed(candidate);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProviderError::AllProvidersExhausted)
    }
}
