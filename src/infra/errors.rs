// src/infra/errors.rs — Error types for majlis

use thiserror::Error;

use crate::game::GameKind;

/// Failures surfaced by the session manager.
///
/// Wrong answers are not errors: they come back as a normal
/// `AnswerResult`. Only `Persistence` is allowed to escalate past the
/// conversation (HTTP 500, process exit in the CLI).
#[derive(Error, Debug)]
pub enum GameError {
    #[error("No game in progress")]
    NoActiveSession,

    #[error("No content available for game '{kind}'")]
    NoContentAvailable { kind: GameKind },

    #[error("Storage error: {0}")]
    Persistence(#[from] anyhow::Error),
}

impl GameError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Persistence(_))
    }
}

/// Model provider errors. These never leave the AI verifier.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("All providers exhausted")]
    AllProvidersExhausted,

    #[error("No model provider configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY.")]
    NoProvider,
}

impl ProviderError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ProviderError::Provider {
                retriable: true,
                ..
            } | ProviderError::RateLimited { .. }
        )
    }
}
