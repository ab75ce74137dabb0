// src/api/handlers.rs

use crate::api::{auth, types::*, ApiState};
use crate::bot::Inbound;
use crate::infra::errors::GameError;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Request failed: {}", e);
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
}

/// POST /api/v1/messages — One inbound chat message.
pub async fn handle_message(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;

    if body.conversation_id.trim().is_empty() || body.user_id.trim().is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "conversation_id and user_id are required",
        ));
    }

    let inbound = Inbound {
        conversation_id: body.conversation_id,
        user_id: body.user_id,
        display_name: body.display_name,
        text: body.text,
    };

    match state.bot.handle(&inbound).await {
        Ok(reply) => Ok(Json(MessageResponse {
            reply: reply.text,
            result: reply.result,
        })),
        Err(e @ GameError::Persistence(_)) => Err(internal(e)),
        // Everything else is already turned into a reply by the bot.
        Err(e) => Err(error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
    }
}

/// GET /api/v1/leaderboard?limit=N
pub async fn leaderboard(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;

    let limit = query.limit.unwrap_or(state.leaderboard_size).clamp(1, 100);
    let entries = state
        .bot
        .manager()
        .ledger()
        .leaderboard(limit)
        .await
        .map_err(internal)?;
    Ok(Json(LeaderboardResponse { entries }))
}

/// GET /api/v1/scores/{user_id}
pub async fn get_score(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<ScoreResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;

    let score = state
        .bot
        .manager()
        .ledger()
        .get(&user_id)
        .await
        .map_err(internal)?;
    Ok(Json(ScoreResponse { score }))
}

/// GET /api/v1/health — Health check (no auth required).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
