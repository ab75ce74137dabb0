// src/verify/ai.rs — Model-assisted verification with deterministic fallback

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{AnswerVerifier, DeterministicVerifier, TextCheck};
use crate::provider::fallback::FallbackChain;
use crate::provider::ChatRequest;

const SYSTEM_PROMPT: &str = "You judge answers in an Arabic chat word game. \
Decide whether the player's answer means the same thing as one of the accepted answers. \
Minor spelling differences, synonyms and extra words are fine; a different thing is not. \
Reply with exactly one word: YES or NO.";

/// Longest candidate worth sending to a model.
const MAX_CANDIDATE_CHARS: usize = 80;

/// Asks the deterministic rule first. Only for semantic kinds, and only
/// when that rule says no, a model gets a bounded chance to say yes.
/// Every provider failure or timeout yields the deterministic result.
pub struct AiVerifier {
    chain: Arc<FallbackChain>,
    timeout: Duration,
}

impl AiVerifier {
    pub fn new(chain: Arc<FallbackChain>, timeout: Duration) -> Self {
        Self { chain, timeout }
    }

    fn build_request(check: &TextCheck) -> ChatRequest {
        ChatRequest {
            model: String::new(),
            system: Some(SYSTEM_PROMPT.into()),
            prompt: format!(
                "Question: {}\nAccepted answers: {}\nPlayer answer: {}\nIs the player's answer correct?",
                check.question,
                check.accepted.join(" | "),
                check.candidate.trim()
            ),
            max_tokens: Some(3),
            temperature: Some(0.0),
        }
    }

    async fn ask_model(&self, check: &TextCheck) -> Option<bool> {
        let request = Self::build_request(check);
        match tokio::time::timeout(self.timeout, self.chain.chat(request)).await {
            Ok(Ok(response)) => {
                debug!(tokens = response.usage.total(), "Judge replied {:?}", response.content);
                Some(parse_verdict(&response.content))
            }
            Ok(Err(e)) => {
                warn!(kind = %check.kind, "Semantic check failed, using exact rule: {}", e);
                None
            }
            Err(_) => {
                warn!(kind = %check.kind, "Semantic check timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

/// Interpret a model reply. Anything that is not a clear yes is a no.
pub fn parse_verdict(reply: &str) -> bool {
    let reply = reply.trim().to_uppercase();
    reply.starts_with("YES") || reply.starts_with("نعم")
}

#[async_trait]
impl AnswerVerifier for AiVerifier {
    async fn verify(&self, check: &TextCheck) -> bool {
        if DeterministicVerifier::check(check) {
            return true;
        }
        let candidate = check.candidate.trim();
        if !check.semantic || candidate.is_empty() || candidate.chars().count() > MAX_CANDIDATE_CHARS
        {
            return false;
        }

        let verdict = self.ask_model(check).await.unwrap_or(false);
        debug!(kind = %check.kind, verdict, "Semantic check");
        verdict
    }

    fn describe(&self) -> &str {
        "ai"
    }
}
