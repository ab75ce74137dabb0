// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::game::AnswerResult;
use crate::ledger::{LeaderboardEntry, ScoreRecord};

/// Webhook body: one chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub conversation_id: String,
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub text: String,
}

/// What the messaging layer should send back. `reply` is absent when the
/// bot has nothing to say.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub reply: Option<String>,
    pub result: Option<AnswerResult>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: Option<ScoreRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
