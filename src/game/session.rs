// src/game/session.rs — Active game state for one conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{GameKind, KindRules, MatchMode};
use super::normalize::{normalize, to_arabic_digits, NormalizePolicy};
use crate::catalog::Question;

/// The user a message came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub display_name: String,
}

impl Player {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Ground truth for a session. The variant must agree with the kind's `MatchMode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpectedAnswer {
    Text {
        answer: String,
    },
    OneOf {
        answers: Vec<String>,
    },
    Chain {
        required_first: char,
    },
    Composition {
        letters: String,
        accepted: Vec<String>,
    },
    Number {
        value: i64,
        #[serde(default)]
        spelled: Vec<String>,
    },
}

impl ExpectedAnswer {
    pub fn text(answer: impl Into<String>) -> Self {
        ExpectedAnswer::Text {
            answer: answer.into(),
        }
    }

    pub fn fits(&self, mode: MatchMode) -> bool {
        match (self, mode) {
            (ExpectedAnswer::Text { .. } | ExpectedAnswer::OneOf { .. }, MatchMode::Exact)
            | (
                ExpectedAnswer::Text { .. } | ExpectedAnswer::OneOf { .. },
                MatchMode::Containment,
            ) => true,
            (ExpectedAnswer::Number { .. }, MatchMode::Numeric) => true,
            (ExpectedAnswer::Chain { .. }, MatchMode::ChainLetter) => true,
            (ExpectedAnswer::Composition { .. }, MatchMode::Composition) => true,
            _ => false,
        }
    }

    /// Literal answers for text comparison. Empty for structural answers.
    pub fn accepted_texts(&self) -> Vec<String> {
        match self {
            ExpectedAnswer::Text { answer } => vec![answer.clone()],
            ExpectedAnswer::OneOf { answers } => answers.clone(),
            ExpectedAnswer::Number { value, spelled } => {
                let mut all = vec![value.to_string()];
                all.extend(spelled.iter().cloned());
                all
            }
            ExpectedAnswer::Composition { accepted, .. } => accepted.clone(),
            ExpectedAnswer::Chain { .. } => Vec::new(),
        }
    }

    /// Human-readable answer, shown when a game is lost.
    pub fn reveal(&self) -> String {
        match self {
            ExpectedAnswer::Text { answer } => answer.clone(),
            ExpectedAnswer::OneOf { answers } => answers.first().cloned().unwrap_or_default(),
            ExpectedAnswer::Chain { required_first } => {
                format!("أي كلمة تبدأ بحرف «{required_first}»")
            }
            ExpectedAnswer::Composition { accepted, .. } => accepted.join("، "),
            ExpectedAnswer::Number { value, .. } => to_arabic_digits(*value),
        }
    }
}

/// Game-specific mutable data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxState {
    /// Normalized answers already accepted (or seeded) in this session.
    #[serde(default)]
    pub used_answers: Vec<String>,
    /// Correct answers so far.
    #[serde(default)]
    pub round: u32,
    pub rounds_to_win: u32,
}

impl AuxState {
    pub fn has_used(&self, normalized: &str) -> bool {
        self.used_answers.iter().any(|u| u == normalized)
    }
}

/// Seed data the catalog may attach to a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxSeed {
    /// Words that count as already used (e.g. the chain's first word).
    #[serde(default)]
    pub used_answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub conversation_id: String,
    pub game_kind: GameKind,
    pub question: String,
    pub expected_answer: ExpectedAnswer,
    pub auxiliary_state: AuxState,
    pub points_value: u32,
    pub attempts_remaining: Option<u32>,
    pub started_by: Player,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        conversation_id: &str,
        kind: GameKind,
        question: Question,
        rules: &KindRules,
        started_by: &Player,
        now: DateTime<Utc>,
    ) -> Self {
        let mut rounds_to_win = rules.continuation.rounds_to_win();
        if let ExpectedAnswer::Composition { accepted, .. } = &question.expected_answer {
            rounds_to_win = rounds_to_win.min(accepted.len().max(1) as u32);
        }

        let used_answers = question
            .auxiliary_seed
            .used_answers
            .iter()
            .map(|w| normalize(w, rules.normalize))
            .collect();

        Self {
            session_id: Uuid::new_v4(),
            conversation_id: conversation_id.to_string(),
            game_kind: kind,
            question: question.question_text,
            expected_answer: question.expected_answer,
            auxiliary_state: AuxState {
                used_answers,
                round: 0,
                rounds_to_win,
            },
            points_value: question.points_value,
            attempts_remaining: rules.max_attempts,
            started_by: started_by.clone(),
            created_at: now,
            expires_at: now + rules.ttl(),
        }
    }

    /// Expired sessions are treated exactly like absent ones.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Opening message for the game.
    pub fn prompt(&self) -> String {
        let ttl = (self.expires_at - self.created_at).num_seconds();
        let mut out = format!(
            "🎮 {} ({} نقاط)\n{}",
            self.game_kind.display_name(),
            to_arabic_digits(self.points_value as i64),
            self.question
        );
        if let Some(hint) = self.progress_hint() {
            out.push('\n');
            out.push_str(&hint);
        }
        out.push_str(&format!("\n⏱ {} ثانية", to_arabic_digits(ttl)));
        out
    }

    /// What the player has to do next in a multi-round game.
    pub fn progress_hint(&self) -> Option<String> {
        let aux = &self.auxiliary_state;
        let left = aux.rounds_to_win.saturating_sub(aux.round);
        match &self.expected_answer {
            ExpectedAnswer::Chain { required_first } => Some(format!(
                "اكتب كلمة تبدأ بحرف «{required_first}» (باقي {})",
                to_arabic_digits(left as i64)
            )),
            ExpectedAnswer::Composition { .. } => Some(format!(
                "باقي {} كلمات",
                to_arabic_digits(left as i64)
            )),
            _ => None,
        }
    }

    /// Normalized accepted answers under the given policy.
    pub fn normalized_answers(&self, policy: NormalizePolicy) -> Vec<String> {
        self.expected_answer
            .accepted_texts()
            .iter()
            .map(|a| normalize(a, policy))
            .collect()
    }
}

/// Why a check came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Correct and the game is over.
    Correct,
    /// Correct and the game continues.
    Advanced,
    /// Wrong, attempts remain.
    Incorrect,
    /// Rejected because it was already given in this session.
    AlreadyUsed,
    /// Wrong and no attempts remain; the answer is revealed.
    AttemptsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub points_awarded: u32,
    pub game_over: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_prompt: Option<String>,
    pub outcome: Outcome,
}
