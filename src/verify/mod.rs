// src/verify/mod.rs — Answer verification
//
// The session manager never asks whether a model is configured; it calls
// an `AnswerVerifier` and gets a yes/no back.

pub mod ai;

use async_trait::async_trait;

use crate::game::kind::{GameKind, MatchMode};
use crate::game::normalize::{contains_either, normalize, parse_number, NormalizePolicy};

pub use ai::AiVerifier;

/// One text comparison request.
#[derive(Debug, Clone)]
pub struct TextCheck {
    pub kind: GameKind,
    /// Question shown to the player, for semantic judges.
    pub question: String,
    /// Raw accepted answers (normalized inside the verifier).
    pub accepted: Vec<String>,
    /// Raw player answer.
    pub candidate: String,
    pub policy: NormalizePolicy,
    pub mode: MatchMode,
    /// Whether a semantic judge may accept what the literal rule rejects.
    pub semantic: bool,
}

#[async_trait]
pub trait AnswerVerifier: Send + Sync {
    async fn verify(&self, check: &TextCheck) -> bool;

    /// Short label for logs.
    fn describe(&self) -> &str;
}

/// Normalized exact, set-membership, numeric, and containment rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeterministicVerifier;

impl DeterministicVerifier {
    pub fn check(check: &TextCheck) -> bool {
        let candidate = normalize(&check.candidate, check.policy);
        if candidate.is_empty() {
            return false;
        }
        let accepted: Vec<String> = check
            .accepted
            .iter()
            .map(|a| normalize(a, check.policy))
            .filter(|a| !a.is_empty())
            .collect();

        match check.mode {
            MatchMode::Numeric => match parse_number(&check.candidate) {
                Some(n) => check
                    .accepted
                    .iter()
                    .any(|a| parse_number(a) == Some(n)),
                None => accepted.iter().any(|a| *a == candidate),
            },
            MatchMode::Containment => accepted.iter().any(|a| contains_either(&candidate, a)),
            MatchMode::Exact | MatchMode::Composition | MatchMode::ChainLetter => {
                accepted.iter().any(|a| *a == candidate)
            }
        }
    }
}

#[async_trait]
impl AnswerVerifier for DeterministicVerifier {
    async fn verify(&self, check: &TextCheck) -> bool {
        Self::check(check)
    }

    fn describe(&self) -> &str {
        "deterministic"
    }
}
