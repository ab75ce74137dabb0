// tests/session_test.rs — Integration test: session lifecycle over SQLite
//
// Drives the SessionManager through the store actor with a fixed catalog
// and a manual clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use majlis::catalog::{sample_answer, ContentCatalog, GameCatalog, Question};
use majlis::game::session::AuxSeed;
use majlis::game::{
    ExpectedAnswer, GameEnd, GameKind, ManualClock, Outcome, Player, Session, SessionManager,
    SessionStore,
};
use majlis::infra::config::GamesConfig;
use majlis::infra::errors::GameError;
use majlis::ledger::ScoreLedger;
use majlis::store::{self, spawn_store_server, StoreHandle};
use majlis::verify::{AnswerVerifier, DeterministicVerifier, TextCheck};

// ─── Test doubles ───────────────────────────────────────────────────────────

/// Always hands out the same question per kind.
struct FixedCatalog {
    questions: HashMap<GameKind, Question>,
}

impl FixedCatalog {
    fn new() -> Self {
        Self {
            questions: HashMap::new(),
        }
    }

    fn with(mut self, kind: GameKind, expected: ExpectedAnswer, seed: &[&str], points: u32) -> Self {
        self.questions.insert(
            kind,
            Question {
                question_text: format!("سؤال {kind}"),
                expected_answer: expected,
                auxiliary_seed: AuxSeed {
                    used_answers: seed.iter().map(|s| s.to_string()).collect(),
                },
                points_value: points,
            },
        );
        self
    }
}

impl GameCatalog for FixedCatalog {
    fn next_question(&self, kind: GameKind) -> Option<Question> {
        self.questions.get(&kind).cloned()
    }
}

/// Never answers.
struct HangingVerifier;

#[async_trait]
impl AnswerVerifier for HangingVerifier {
    async fn verify(&self, _check: &TextCheck) -> bool {
        std::future::pending::<()>().await;
        false
    }

    fn describe(&self) -> &str {
        "hanging"
    }
}

/// Delegates to the real store but cannot commit a finished game.
struct LockedOnFinish(StoreHandle);

/// Commits a finished game, then stalls before handing back the result.
struct StallAfterFinish(StoreHandle);

#[async_trait]
impl SessionStore for LockedOnFinish {
    async fn load(&self, conversation_id: &str) -> anyhow::Result<Option<Session>> {
        self.0.load(conversation_id).await
    }
    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.0.save(session).await
    }
    async fn remove(&self, conversation_id: &str) -> anyhow::Result<bool> {
        self.0.remove(conversation_id).await
    }
    async fn expired(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        self.0.expired(now).await
    }
    async fn finish(&self, _: &Session, _: &Player, _: GameEnd) -> anyhow::Result<Option<i64>> {
        anyhow::bail!("database is locked")
    }
}

#[async_trait]
impl SessionStore for StallAfterFinish {
    async fn load(&self, conversation_id: &str) -> anyhow::Result<Option<Session>> {
        self.0.load(conversation_id).await
    }
    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.0.save(session).await
    }
    async fn remove(&self, conversation_id: &str) -> anyhow::Result<bool> {
        self.0.remove(conversation_id).await
    }
    async fn expired(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        self.0.expired(now).await
    }
    async fn finish(
        &self,
        session: &Session,
        player: &Player,
        end: GameEnd,
    ) -> anyhow::Result<Option<i64>> {
        let total = self.0.finish(session, player, end).await?;
        tokio::time::sleep(StdDuration::from_secs(5)).await;
        Ok(total)
    }
}

// ─── Harness ────────────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
}

fn sara() -> Player {
    Player::new("u1", "سارة")
}

fn standard_catalog() -> FixedCatalog {
    FixedCatalog::new()
        .with(
            GameKind::Chain,
            ExpectedAnswer::Chain { required_first: 'ب' },
            &["كتاب"],
            5,
        )
        .with(GameKind::Riddle, ExpectedAnswer::text("البيضة"), &[], 3)
        .with(GameKind::Quiz, ExpectedAnswer::text("الرباط"), &[], 2)
        .with(
            GameKind::Math,
            ExpectedAnswer::Number {
                value: 42,
                spelled: vec!["اثنان واربعون".into()],
            },
            &[],
            2,
        )
        .with(
            GameKind::Letters,
            ExpectedAnswer::Composition {
                letters: "كتبم".into(),
                accepted: vec!["كتب".into(), "مكتب".into()],
            },
            &[],
            3,
        )
}

struct Harness {
    manager: Arc<SessionManager>,
    store: StoreHandle,
    clock: Arc<ManualClock>,
}

fn harness_with(catalog: Arc<dyn GameCatalog>, verifier: Arc<dyn AnswerVerifier>) -> Harness {
    harness_over(catalog, verifier, |handle| Arc::new(handle) as Arc<dyn SessionStore>)
}

/// `wrap` decides which session store the manager talks to.
fn harness_over(
    catalog: Arc<dyn GameCatalog>,
    verifier: Arc<dyn AnswerVerifier>,
    wrap: impl FnOnce(StoreHandle) -> Arc<dyn SessionStore>,
) -> Harness {
    let (handle, _task) = spawn_store_server(store::in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(t0()));
    let manager = SessionManager::new(
        wrap(handle.clone()),
        catalog,
        verifier,
        Arc::new(handle.clone()),
        GamesConfig::default(),
    )
    .with_clock(clock.clone());
    Harness {
        manager: Arc::new(manager),
        store: handle,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(standard_catalog()), Arc::new(DeterministicVerifier))
}

// ─── Lifecycle ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_answer_without_start_is_no_active_session() {
    let h = harness();
    let err = h
        .manager
        .check_answer("group-1", &sara(), "أي شيء")
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NoActiveSession));
}

#[tokio::test]
async fn test_builtin_catalog_answers_are_accepted() {
    let catalog = Arc::new(ContentCatalog::builtin());
    let h = harness_with(catalog, Arc::new(DeterministicVerifier));

    for kind in GameKind::ALL {
        let conversation = format!("conv-{kind}");
        let (prompt, session) = h.manager.start(&conversation, &sara(), kind).await.unwrap();
        assert!(!prompt.is_empty());

        let Some(answer) = sample_answer(&session.expected_answer) else {
            continue;
        };
        let result = h
            .manager
            .check_answer(&conversation, &sara(), &answer)
            .await
            .unwrap();
        assert!(result.correct, "{kind}: {answer} was rejected");
    }
}

#[tokio::test]
async fn test_riddle_containment_win_awards_once() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let result = h
        .manager
        .check_answer("group-1", &sara(), "بيضة")
        .await
        .unwrap();
    assert!(result.correct);
    assert!(result.game_over);
    assert_eq!(result.points_awarded, 3);
    assert_eq!(result.outcome, Outcome::Correct);
    assert!(result.message.contains("سارة"));

    // The session is gone; a second identical answer must not score again.
    let err = h
        .manager
        .check_answer("group-1", &sara(), "بيضة")
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NoActiveSession));

    let record = h.store.get_score("u1").await.unwrap().unwrap();
    assert_eq!(record.total_points, 3);
    assert_eq!(record.wins, 1);
}

#[tokio::test]
async fn test_riddle_single_shot_wrong_reveals_answer() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let result = h
        .manager
        .check_answer("group-1", &sara(), "القمر")
        .await
        .unwrap();
    assert!(!result.correct);
    assert!(result.game_over);
    assert_eq!(result.outcome, Outcome::AttemptsExhausted);
    assert!(result.message.contains("البيضة"));
    assert!(h.manager.peek("group-1").await.unwrap().is_none());
    // No record is created for a loss.
    assert!(h.store.get_score("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_quiz_attempts_count_down() {
    let h = harness();
    h.store.award("u1", "سارة", 1).await.unwrap();
    h.manager.start("group-1", &sara(), GameKind::Quiz).await.unwrap();

    let first = h
        .manager
        .check_answer("group-1", &sara(), "فاس")
        .await
        .unwrap();
    assert_eq!(first.outcome, Outcome::Incorrect);
    assert!(!first.game_over);
    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.attempts_remaining, Some(1));

    let second = h
        .manager
        .check_answer("group-1", &sara(), "طنجة")
        .await
        .unwrap();
    assert_eq!(second.outcome, Outcome::AttemptsExhausted);
    assert!(second.game_over);

    let record = h.store.get_score("u1").await.unwrap().unwrap();
    assert_eq!(record.games_played, 2);
    assert_eq!(record.total_points, 1);
}

#[tokio::test]
async fn test_quiz_accepts_article_variants() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Quiz).await.unwrap();
    let result = h
        .manager
        .check_answer("group-1", &sara(), "  رباط ")
        .await
        .unwrap();
    assert!(result.correct);
}

#[tokio::test]
async fn test_blank_answer_changes_nothing() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Quiz).await.unwrap();
    let result = h
        .manager
        .check_answer("group-1", &sara(), "ـــ  ")
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Incorrect);
    assert!(!result.game_over);
    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.attempts_remaining, Some(2));
}

#[tokio::test]
async fn test_math_accepts_arabic_indic_digits() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Math).await.unwrap();
    let result = h
        .manager
        .check_answer("group-1", &sara(), "٤٢")
        .await
        .unwrap();
    assert!(result.correct);
    assert_eq!(result.points_awarded, 2);
}

#[tokio::test]
async fn test_start_replaces_running_game() {
    let h = harness();
    let (_, first) = h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();
    let (_, second) = h.manager.start("group-1", &sara(), GameKind::Quiz).await.unwrap();
    assert_ne!(first.session_id, second.session_id);

    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.session_id, second.session_id);
    assert_eq!(live.game_kind, GameKind::Quiz);
}

#[tokio::test]
async fn test_start_without_content() {
    let h = harness();
    let err = h
        .manager
        .start("group-1", &sara(), GameKind::FastType)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::NoContentAvailable {
            kind: GameKind::FastType
        }
    ));
    assert!(h.manager.peek("group-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stop_returns_session_without_scoring() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let stopped = h.manager.stop("group-1").await.unwrap().unwrap();
    assert_eq!(stopped.game_kind, GameKind::Riddle);
    assert!(h.manager.stop("group-1").await.unwrap().is_none());
    assert!(h.store.get_score("u1").await.unwrap().is_none());
}

// ─── Chain and letters ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_chain_scenario() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Chain).await.unwrap();

    let result = h
        .manager
        .check_answer("group-1", &sara(), "بيت")
        .await
        .unwrap();
    assert!(result.correct);
    assert!(!result.game_over);
    assert_eq!(result.outcome, Outcome::Advanced);
    assert_eq!(result.points_awarded, 0);

    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(
        live.expected_answer,
        ExpectedAnswer::Chain { required_first: 'ت' }
    );

    let again = h
        .manager
        .check_answer("group-1", &sara(), "بيت")
        .await
        .unwrap();
    assert_eq!(again.outcome, Outcome::AlreadyUsed);
    assert!(!again.correct);

    // Article is stripped before taking the first letter.
    let result = h
        .manager
        .check_answer("group-1", &sara(), "التمر")
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Advanced);
}

#[tokio::test]
async fn test_chain_repeat_beats_letter_rule() {
    let catalog = FixedCatalog::new().with(
        GameKind::Chain,
        ExpectedAnswer::Chain { required_first: 'ق' },
        &["قمر"],
        5,
    );
    let h = harness_with(Arc::new(catalog), Arc::new(DeterministicVerifier));
    h.manager.start("group-1", &sara(), GameKind::Chain).await.unwrap();

    let result = h
        .manager
        .check_answer("group-1", &sara(), "قمر")
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::AlreadyUsed);
    assert_eq!(result.points_awarded, 0);

    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.attempts_remaining, Some(3));
}

#[tokio::test]
async fn test_chain_trailing_hamza_continues_with_alef() {
    let catalog = FixedCatalog::new().with(
        GameKind::Chain,
        ExpectedAnswer::Chain { required_first: 'ب' },
        &["كتاب"],
        5,
    );
    let h = harness_with(Arc::new(catalog), Arc::new(DeterministicVerifier));
    h.manager.start("group-1", &sara(), GameKind::Chain).await.unwrap();

    h.manager
        .check_answer("group-1", &sara(), "بناء")
        .await
        .unwrap();
    let result = h
        .manager
        .check_answer("group-1", &sara(), "أسد")
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Advanced);
}

#[tokio::test]
async fn test_chain_win_after_all_rounds() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Chain).await.unwrap();

    // ب → بيت → تمر → رمل → لبن → نور
    for word in ["بيت", "تمر", "رمل", "لبن"] {
        let r = h
            .manager
            .check_answer("group-1", &sara(), word)
            .await
            .unwrap();
        assert_eq!(r.outcome, Outcome::Advanced, "{word}");
    }
    let last = h
        .manager
        .check_answer("group-1", &sara(), "نور")
        .await
        .unwrap();
    assert_eq!(last.outcome, Outcome::Correct);
    assert!(last.game_over);
    assert_eq!(last.points_awarded, 5);
    assert_eq!(h.store.get_score("u1").await.unwrap().unwrap().total_points, 5);
}

#[tokio::test]
async fn test_letters_composition_rounds() {
    let h = harness();
    let (_, session) = h.manager.start("group-1", &sara(), GameKind::Letters).await.unwrap();
    // Capped at the number of accepted words.
    assert_eq!(session.auxiliary_state.rounds_to_win, 2);

    let first = h
        .manager
        .check_answer("group-1", &sara(), "كتب")
        .await
        .unwrap();
    assert_eq!(first.outcome, Outcome::Advanced);

    let repeat = h
        .manager
        .check_answer("group-1", &sara(), "كتب")
        .await
        .unwrap();
    assert_eq!(repeat.outcome, Outcome::AlreadyUsed);

    // Spellable but not a listed word.
    let wrong = h
        .manager
        .check_answer("group-1", &sara(), "بتك")
        .await
        .unwrap();
    assert_eq!(wrong.outcome, Outcome::Incorrect);

    let done = h
        .manager
        .check_answer("group-1", &sara(), "مكتب")
        .await
        .unwrap();
    assert_eq!(done.outcome, Outcome::Correct);
    assert_eq!(done.points_awarded, 3);
}

// ─── Expiry ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expires_at_ttl_boundary() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    h.clock.advance(Duration::seconds(119));
    assert!(h.manager.peek("group-1").await.unwrap().is_some());

    h.clock.advance(Duration::seconds(1));
    let err = h
        .manager
        .check_answer("group-1", &sara(), "البيضة")
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NoActiveSession));
    // Reaped on access.
    assert_eq!(h.store.count_sessions().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expire_sweep_removes_only_due_sessions() {
    let h = harness();
    h.manager.start("old", &sara(), GameKind::Riddle).await.unwrap();
    h.clock.advance(Duration::seconds(100));
    h.manager.start("new", &sara(), GameKind::Riddle).await.unwrap();

    let removed = h.manager.expire_sweep(t0() + Duration::seconds(120)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(h.manager.peek("new").await.unwrap().is_some());

    let removed = h.manager.expire_sweep(t0() + Duration::seconds(120)).await.unwrap();
    assert_eq!(removed, 0);
    assert!(h.store.get_score("u1").await.unwrap().is_none());
}

// ─── Concurrency and failure ────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_correct_answers_score_once() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let omar = Player::new("u2", "عمر");
    let sara_player = sara();
    let (a, b) = tokio::join!(
        h.manager.check_answer("group-1", &sara_player, "البيضة"),
        h.manager.check_answer("group-1", &omar, "البيضة"),
    );

    let wins = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Ok(result) if result.correct))
        .count();
    let missed = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(GameError::NoActiveSession)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(missed, 1);

    let board = h.store.leaderboard(10).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].points, 3);
}

#[tokio::test]
async fn test_different_conversations_do_not_block_each_other() {
    let h = harness();
    h.manager.start("a", &sara(), GameKind::Quiz).await.unwrap();
    h.manager.start("b", &sara(), GameKind::Quiz).await.unwrap();

    let sara_a = sara();
    let sara_b = sara();
    let (a, b) = tokio::join!(
        h.manager.check_answer("a", &sara_a, "الرباط"),
        h.manager.check_answer("b", &sara_b, "الرباط"),
    );
    assert!(a.unwrap().correct);
    assert!(b.unwrap().correct);
    assert_eq!(h.store.get_score("u1").await.unwrap().unwrap().total_points, 4);
}

#[tokio::test]
async fn test_cancelled_check_leaves_session_untouched() {
    let h = harness_with(Arc::new(standard_catalog()), Arc::new(HangingVerifier));
    h.manager.start("group-1", &sara(), GameKind::Quiz).await.unwrap();

    let timed_out = tokio::time::timeout(
        StdDuration::from_millis(50),
        h.manager.check_answer("group-1", &sara(), "فاس"),
    )
    .await;
    assert!(timed_out.is_err());

    // Lock released, attempts unchanged.
    let live = h.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.attempts_remaining, Some(2));
}

#[tokio::test]
async fn test_cancel_during_finish_scores_once() {
    let h = harness_over(
        Arc::new(standard_catalog()),
        Arc::new(DeterministicVerifier),
        |handle| Arc::new(StallAfterFinish(handle)) as Arc<dyn SessionStore>,
    );
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let timed_out = tokio::time::timeout(
        StdDuration::from_millis(100),
        h.manager.check_answer("group-1", &sara(), "البيضة"),
    )
    .await;
    assert!(timed_out.is_err());

    // The win and the delete landed together, so a retry finds nothing.
    let err = h
        .manager
        .check_answer("group-1", &sara(), "البيضة")
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NoActiveSession));

    let record = h.store.get_score("u1").await.unwrap().unwrap();
    assert_eq!(record.total_points, 3);
    assert_eq!(record.wins, 1);
}

#[tokio::test]
async fn test_finish_failure_keeps_session_and_scores_nothing() {
    let h = harness_over(
        Arc::new(standard_catalog()),
        Arc::new(DeterministicVerifier),
        |handle| Arc::new(LockedOnFinish(handle)) as Arc<dyn SessionStore>,
    );
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();

    let err = h
        .manager
        .check_answer("group-1", &sara(), "البيضة")
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Persistence(_)));
    assert!(err.is_fatal());
    assert!(h.manager.peek("group-1").await.unwrap().is_some());
    assert!(h.store.get_score("u1").await.unwrap().is_none());
}

// ─── Ledger ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reset_then_leaderboard_is_empty() {
    let h = harness();
    h.manager.start("group-1", &sara(), GameKind::Riddle).await.unwrap();
    h.manager
        .check_answer("group-1", &sara(), "البيضة")
        .await
        .unwrap();

    let ledger: Arc<dyn ScoreLedger> = Arc::new(h.store.clone());
    assert_eq!(ledger.leaderboard(5).await.unwrap().len(), 1);
    assert_eq!(ledger.reset_all().await.unwrap(), 1);
    assert!(ledger.leaderboard(5).await.unwrap().is_empty());
}
