// tests/bot_test.rs — Integration test: chat commands and the HTTP API

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use majlis::api::types::{LeaderboardResponse, MessageResponse, ScoreResponse};
use majlis::api::{build_router, ApiState};
use majlis::app::App;
use majlis::bot::{Inbound, Reply};
use majlis::catalog::sample_answer;
use majlis::game::{ManualClock, Outcome};
use majlis::infra::config::Config;
use majlis::store;

fn test_app() -> (App, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap(),
    ));
    let app = App::build_with(
        &Config::default(),
        store::in_memory().unwrap(),
        Vec::new(),
        Some(clock.clone()),
    )
    .unwrap();
    (app, clock)
}

fn msg(conversation: &str, user: &str, name: &str, text: &str) -> Inbound {
    Inbound {
        conversation_id: conversation.into(),
        user_id: user.into(),
        display_name: Some(name.into()),
        text: text.into(),
    }
}

async fn say(app: &App, text: &str) -> Reply {
    app.bot
        .handle(&msg("group-1", "u1", "سارة", text))
        .await
        .unwrap()
}

/// The literal answer of the running game.
async fn current_answer(app: &App, conversation: &str) -> String {
    let session = app.manager.peek(conversation).await.unwrap().unwrap();
    sample_answer(&session.expected_answer).unwrap()
}

// ─── Chat commands ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chatter_without_game_is_silent() {
    let (app, _) = test_app();
    let reply = say(&app, "السلام عليكم").await;
    assert_eq!(reply, Reply::default());
}

#[tokio::test]
async fn test_riddle_round_trip() {
    let (app, _) = test_app();

    let opening = say(&app, "لغز").await;
    assert!(opening.text.unwrap().contains("لغز"));

    let answer = current_answer(&app, "group-1").await;
    let reply = say(&app, &answer).await;
    let result = reply.result.unwrap();
    assert!(result.correct && result.game_over);
    assert_eq!(result.outcome, Outcome::Correct);
    assert!(reply.text.unwrap().contains("أحسنت يا سارة"));

    let points = say(&app, "نقاطي").await.text.unwrap();
    assert!(points.contains("سارة"));
    assert!(points.contains("٣"));

    let board = say(&app, "الصدارة").await.text.unwrap();
    assert!(board.contains("🥇"));
    assert!(board.contains("سارة"));
}

#[tokio::test]
async fn test_stop_reveals_answer() {
    let (app, _) = test_app();
    say(&app, "/quiz").await;
    let answer = current_answer(&app, "group-1").await;

    let reply = say(&app, "انسحب").await.text.unwrap();
    assert!(reply.contains(&answer));
    assert_eq!(say(&app, "انسحب").await.text.unwrap(), "لا توجد لعبة جارية.");
    // Chatter after stopping is ignored again.
    assert_eq!(say(&app, &answer).await, Reply::default());
}

#[tokio::test]
async fn test_hint_shows_time_left() {
    let (app, clock) = test_app();
    say(&app, "حساب").await;
    clock.advance(Duration::seconds(20));

    let hint = say(&app, "السؤال").await.text.unwrap();
    assert!(hint.contains("حساب سريع"));
    // Math lives 60 seconds.
    assert!(hint.contains("٤٠"));
}

#[tokio::test]
async fn test_expired_game_goes_quiet() {
    let (app, clock) = test_app();
    say(&app, "/fast").await;
    let answer = current_answer(&app, "group-1").await;

    clock.advance(Duration::seconds(31));
    assert_eq!(say(&app, &answer).await, Reply::default());
}

#[tokio::test]
async fn test_trigger_during_game_starts_new_one() {
    let (app, _) = test_app();
    say(&app, "/quiz").await;
    say(&app, "لغز").await;
    let live = app.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.game_kind.as_str(), "riddle");
}

#[tokio::test]
async fn test_trigger_word_is_a_chain_answer() {
    let (app, _) = test_app();
    say(&app, "سلسلة").await;
    let started = app.manager.peek("group-1").await.unwrap().unwrap();

    // A bare trigger word is played as a chain word.
    let reply = say(&app, "لغز").await;
    assert!(reply.result.is_some());
    let live = app.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.session_id, started.session_id);

    // Only the slash form restarts.
    say(&app, "/riddle").await;
    let live = app.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.game_kind.as_str(), "riddle");
}

#[tokio::test]
async fn test_trigger_word_is_a_letters_answer() {
    let (app, _) = test_app();
    say(&app, "حروف").await;
    let reply = say(&app, "حساب").await;
    assert!(reply.result.is_some());
    let live = app.manager.peek("group-1").await.unwrap().unwrap();
    assert_eq!(live.game_kind.as_str(), "letters");
}

#[tokio::test]
async fn test_conversations_are_independent() {
    let (app, _) = test_app();
    app.bot
        .handle(&msg("a", "u1", "سارة", "لغز"))
        .await
        .unwrap();
    let reply = app
        .bot
        .handle(&msg("b", "u1", "سارة", "البيضة"))
        .await
        .unwrap();
    assert_eq!(reply, Reply::default());
    assert!(app.manager.peek("a").await.unwrap().is_some());
}

// ─── HTTP API ───────────────────────────────────────────────────────────────

fn router(app: &App, token: Option<&str>) -> axum::Router {
    let mut config = Config::default().server;
    config.token = token.map(str::to_string);
    build_router(ApiState::new(app.bot.clone(), &config), &[])
}

fn post_message(body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/messages")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let (app, _) = test_app();
    let response = router(&app, Some("s3cret"))
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_message_requires_token_when_configured() {
    let (app, _) = test_app();
    let body = serde_json::json!({
        "conversation_id": "group-1",
        "user_id": "u1",
        "text": "مساعدة"
    });

    let denied = router(&app, Some("s3cret"))
        .oneshot(post_message(body.clone(), None))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let wrong = router(&app, Some("s3cret"))
        .oneshot(post_message(body.clone(), Some("guess")))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let mut via_header = post_message(body.clone(), None);
    via_header
        .headers_mut()
        .insert("x-majlis-token", "s3cret".parse().unwrap());
    let ok = router(&app, Some("s3cret")).oneshot(via_header).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let allowed = router(&app, Some("s3cret"))
        .oneshot(post_message(body, Some("s3cret")))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    let reply: MessageResponse = json(allowed).await;
    assert!(reply.reply.unwrap().contains("الألعاب المتاحة"));
}

#[tokio::test]
async fn test_message_rejects_blank_ids() {
    let (app, _) = test_app();
    let response = router(&app, None)
        .oneshot(post_message(
            serde_json::json!({ "conversation_id": " ", "user_id": "u1", "text": "لغز" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_game_over_http_then_scores() {
    let (app, _) = test_app();
    let start = router(&app, None)
        .oneshot(post_message(
            serde_json::json!({
                "conversation_id": "group-1",
                "user_id": "u7",
                "display_name": "عمر",
                "text": "/riddle"
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(start.status(), StatusCode::OK);

    let answer = current_answer(&app, "group-1").await;
    let response = router(&app, None)
        .oneshot(post_message(
            serde_json::json!({
                "conversation_id": "group-1",
                "user_id": "u7",
                "display_name": "عمر",
                "text": answer
            }),
            None,
        ))
        .await
        .unwrap();
    let reply: MessageResponse = json(response).await;
    let result = reply.result.unwrap();
    assert!(result.correct);
    assert_eq!(result.points_awarded, 3);

    let board = router(&app, None)
        .oneshot(
            Request::builder()
                .uri("/api/v1/leaderboard?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let board: LeaderboardResponse = json(board).await;
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].user_id, "u7");
    assert_eq!(board.entries[0].points, 3);

    let score = router(&app, None)
        .oneshot(
            Request::builder()
                .uri("/api/v1/scores/u7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let score: ScoreResponse = json(score).await;
    assert_eq!(score.score.unwrap().wins, 1);

    let missing = router(&app, None)
        .oneshot(
            Request::builder()
                .uri("/api/v1/scores/nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let missing: ScoreResponse = json(missing).await;
    assert!(missing.score.is_none());
}
