// src/game/manager.rs — Session lifecycle and answer resolution
//
// Per conversation:
//   NONE --start--> ACTIVE
//   ACTIVE --correct, rounds left--> ACTIVE (advanced)
//   ACTIVE --correct, last round--> NONE (points awarded)
//   ACTIVE --wrong, attempts left--> ACTIVE (attempt spent)
//   ACTIVE --wrong, no attempts--> NONE (answer revealed)
//   ACTIVE --ttl elapsed--> NONE (silently, on access or sweep)
//   any --start--> ACTIVE (previous session discarded)
//
// Every operation holds the conversation's lock from read to commit. A
// check computes the successor state in memory and writes it only after
// the verifier has answered, so a dropped future leaves the stored session
// as it was. Ending a game deletes the session and scores it in one store
// transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::kind::{GameKind, KindRules, MatchMode};
use super::locks::KeyLocks;
use super::normalize::{
    chain_letter, first_letter, last_letter, letters_cover, normalize, to_arabic_digits,
};
use super::repository::{GameEnd, SessionStore};
use super::session::{AnswerResult, ExpectedAnswer, Outcome, Player, Session};
use crate::catalog::GameCatalog;
use crate::infra::config::GamesConfig;
use crate::infra::errors::GameError;
use crate::ledger::ScoreLedger;
use crate::verify::{AnswerVerifier, TextCheck};

pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    catalog: Arc<dyn GameCatalog>,
    verifier: Arc<dyn AnswerVerifier>,
    ledger: Arc<dyn ScoreLedger>,
    clock: Arc<dyn Clock>,
    games: GamesConfig,
    locks: KeyLocks,
}

/// How a candidate compared, before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Right,
    Wrong,
    Repeat,
    /// Nothing left after normalization.
    Blank,
}

/// What to write once the check is complete.
enum Commit {
    Keep,
    Save(Session),
    Finish { won: bool },
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<dyn GameCatalog>,
        verifier: Arc<dyn AnswerVerifier>,
        ledger: Arc<dyn ScoreLedger>,
        games: GamesConfig,
    ) -> Self {
        Self {
            sessions,
            catalog,
            verifier,
            ledger,
            clock: Arc::new(SystemClock),
            games,
            locks: KeyLocks::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn rules(&self, kind: GameKind) -> KindRules {
        kind.rules(&self.games)
    }

    pub fn ledger(&self) -> &Arc<dyn ScoreLedger> {
        &self.ledger
    }

    /// Start a game, replacing whatever was running in the conversation.
    pub async fn start(
        &self,
        conversation_id: &str,
        player: &Player,
        kind: GameKind,
    ) -> Result<(String, Session), GameError> {
        let _guard = self.locks.lock(conversation_id).await;
        let rules = self.rules(kind);

        let question = self
            .catalog
            .next_question(kind)
            .ok_or(GameError::NoContentAvailable { kind })?;
        if !question.expected_answer.fits(rules.matching) {
            warn!(%kind, "Catalog returned an answer the {:?} rule cannot check", rules.matching);
            return Err(GameError::NoContentAvailable { kind });
        }

        let session = Session::new(
            conversation_id,
            kind,
            question,
            &rules,
            player,
            self.clock.now(),
        );
        self.sessions.save(&session).await?;

        info!(
            conversation = conversation_id,
            session = %session.session_id,
            %kind,
            user = %player.user_id,
            "Game started"
        );
        Ok((session.prompt(), session))
    }

    /// Resolve one answer against the live session.
    pub async fn check_answer(
        &self,
        conversation_id: &str,
        player: &Player,
        raw_answer: &str,
    ) -> Result<AnswerResult, GameError> {
        let _guard = self.locks.lock(conversation_id).await;
        let now = self.clock.now();
        let session = self.load_live(conversation_id, now).await?;
        let rules = self.rules(session.game_kind);

        let candidate = normalize(raw_answer, rules.normalize);
        let verdict = if candidate.is_empty() {
            Verdict::Blank
        } else if rules.anti_repetition && session.auxiliary_state.has_used(&candidate) {
            Verdict::Repeat
        } else if self.is_correct(&session, &rules, raw_answer, &candidate).await {
            Verdict::Right
        } else {
            Verdict::Wrong
        };

        debug!(
            conversation = conversation_id,
            session = %session.session_id,
            ?verdict,
            "Answer checked"
        );

        let (mut result, commit) = transition(session.clone(), verdict, raw_answer, &candidate);

        match commit {
            Commit::Keep => {}
            Commit::Save(next) => self.sessions.save(&next).await?,
            Commit::Finish { won } => {
                let end = if won {
                    GameEnd::Won {
                        points: result.points_awarded,
                    }
                } else {
                    GameEnd::Lost
                };
                let total = self.sessions.finish(&session, player, end).await?;
                if let Some(total) = total {
                    result.message = format!(
                        "✅ أحسنت يا {}! +{} نقاط (مجموعك {})",
                        player.display_name,
                        to_arabic_digits(result.points_awarded as i64),
                        to_arabic_digits(total)
                    );
                }
                info!(
                    conversation = conversation_id,
                    session = %session.session_id,
                    kind = %session.game_kind,
                    user = %player.user_id,
                    won,
                    points = result.points_awarded,
                    "Game over"
                );
            }
        }

        Ok(result)
    }

    /// End the game without scoring. Returns the session that was running.
    pub async fn stop(&self, conversation_id: &str) -> Result<Option<Session>, GameError> {
        let _guard = self.locks.lock(conversation_id).await;
        let now = self.clock.now();
        match self.load_live(conversation_id, now).await {
            Ok(session) => {
                self.sessions.remove(conversation_id).await?;
                info!(
                    conversation = conversation_id,
                    session = %session.session_id,
                    "Game stopped"
                );
                Ok(Some(session))
            }
            Err(GameError::NoActiveSession) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The live session, if any. Expired sessions are reaped.
    pub async fn peek(&self, conversation_id: &str) -> Result<Option<Session>, GameError> {
        let _guard = self.locks.lock(conversation_id).await;
        let now = self.clock.now();
        match self.load_live(conversation_id, now).await {
            Ok(session) => Ok(Some(session)),
            Err(GameError::NoActiveSession) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove every session with `expires_at <= now`. No scoring, no messages.
    pub async fn expire_sweep(&self, now: DateTime<Utc>) -> Result<usize, GameError> {
        let candidates = self.sessions.expired(now).await?;
        let mut removed = 0;

        for conversation_id in candidates {
            let _guard = self.locks.lock(&conversation_id).await;
            // A start may have replaced it while we waited for the lock.
            let still_expired = match self.sessions.load(&conversation_id).await? {
                Some(s) => s.is_expired(now),
                None => false,
            };
            if still_expired && self.sessions.remove(&conversation_id).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "Expired sessions swept");
        }
        Ok(removed)
    }

    async fn load_live(
        &self,
        conversation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, GameError> {
        let session = self
            .sessions
            .load(conversation_id)
            .await?
            .ok_or(GameError::NoActiveSession)?;

        if session.is_expired(now) {
            self.sessions.remove(conversation_id).await?;
            debug!(
                conversation = conversation_id,
                session = %session.session_id,
                "Reaped expired session on access"
            );
            return Err(GameError::NoActiveSession);
        }
        Ok(session)
    }

    async fn is_correct(
        &self,
        session: &Session,
        rules: &KindRules,
        raw_answer: &str,
        candidate: &str,
    ) -> bool {
        match (&session.expected_answer, rules.matching) {
            (ExpectedAnswer::Chain { required_first }, MatchMode::ChainLetter) => {
                first_letter(candidate).map(chain_letter) == Some(*required_first)
            }
            (ExpectedAnswer::Composition { letters, accepted }, MatchMode::Composition) => {
                let pool = normalize(letters, rules.normalize);
                letters_cover(&pool, candidate)
                    && self
                        .verifier
                        .verify(&TextCheck {
                            kind: session.game_kind,
                            question: session.question.clone(),
                            accepted: accepted.clone(),
                            candidate: raw_answer.to_string(),
                            policy: rules.normalize,
                            mode: MatchMode::Exact,
                            semantic: false,
                        })
                        .await
            }
            (expected, mode) if expected.fits(mode) => {
                self.verifier
                    .verify(&TextCheck {
                        kind: session.game_kind,
                        question: session.question.clone(),
                        accepted: expected.accepted_texts(),
                        candidate: raw_answer.to_string(),
                        policy: rules.normalize,
                        mode,
                        semantic: rules.semantic,
                    })
                    .await
            }
            (_, mode) => {
                warn!(
                    session = %session.session_id,
                    "Stored answer does not fit the {:?} rule",
                    mode
                );
                false
            }
        }
    }
}

/// Successor state for one checked answer. Pure: no I/O.
fn transition(
    mut session: Session,
    verdict: Verdict,
    raw_answer: &str,
    candidate: &str,
) -> (AnswerResult, Commit) {
    match verdict {
        Verdict::Blank => (
            AnswerResult {
                correct: false,
                points_awarded: 0,
                game_over: false,
                message: "❌ إجابة فارغة".to_string(),
                next_prompt: session.progress_hint(),
                outcome: Outcome::Incorrect,
            },
            Commit::Keep,
        ),
        Verdict::Repeat => (
            AnswerResult {
                correct: false,
                points_awarded: 0,
                game_over: false,
                message: format!("⚠️ «{}» استُخدمت من قبل", raw_answer.trim()),
                next_prompt: session.progress_hint(),
                outcome: Outcome::AlreadyUsed,
            },
            Commit::Keep,
        ),
        Verdict::Right => {
            let aux = &mut session.auxiliary_state;
            aux.round += 1;
            if !aux.has_used(candidate) {
                aux.used_answers.push(candidate.to_string());
            }

            if aux.round >= aux.rounds_to_win {
                let points = session.points_value;
                return (
                    AnswerResult {
                        correct: true,
                        points_awarded: points,
                        game_over: true,
                        message: format!("✅ إجابة صحيحة! +{} نقاط", to_arabic_digits(points as i64)),
                        next_prompt: None,
                        outcome: Outcome::Correct,
                    },
                    Commit::Finish { won: true },
                );
            }

            if let ExpectedAnswer::Chain { required_first } = &mut session.expected_answer {
                if let Some(next) = last_letter(candidate) {
                    *required_first = chain_letter(next);
                }
            }
            let hint = session.progress_hint();
            (
                AnswerResult {
                    correct: true,
                    points_awarded: 0,
                    game_over: false,
                    message: "✅ صحيح!".to_string(),
                    next_prompt: hint,
                    outcome: Outcome::Advanced,
                },
                Commit::Save(session),
            )
        }
        Verdict::Wrong => {
            let left = session.attempts_remaining.map(|n| n.saturating_sub(1));
            match left {
                Some(n) if n > 0 => {
                    session.attempts_remaining = Some(n);
                    let hint = session.progress_hint();
                    (
                        AnswerResult {
                            correct: false,
                            points_awarded: 0,
                            game_over: false,
                            message: format!("❌ خطأ، باقي {} محاولات", to_arabic_digits(n as i64)),
                            next_prompt: hint,
                            outcome: Outcome::Incorrect,
                        },
                        Commit::Save(session),
                    )
                }
                _ => (
                    AnswerResult {
                        correct: false,
                        points_awarded: 0,
                        game_over: true,
                        message: format!(
                            "❌ انتهت اللعبة. الإجابة: {}",
                            session.expected_answer.reveal()
                        ),
                        next_prompt: None,
                        outcome: Outcome::AttemptsExhausted,
                    },
                    Commit::Finish { won: false },
                ),
            }
        }
    }
}
