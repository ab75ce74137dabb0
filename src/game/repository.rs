// src/game/repository.rs — Session persistence seam

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::session::{Player, Session};

/// How a finished game counts for the player who ended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    Won { points: u32 },
    Lost,
}

/// Keyed storage for live sessions: point lookup, upsert, delete, and
/// scan-by-expiry. Each call is atomic for its key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, conversation_id: &str) -> anyhow::Result<Option<Session>>;

    /// Insert or replace the session for its conversation.
    async fn save(&self, session: &Session) -> anyhow::Result<()>;

    /// Returns whether a row was deleted.
    async fn remove(&self, conversation_id: &str) -> anyhow::Result<bool>;

    /// Conversation ids whose session has `expires_at <= now`.
    async fn expired(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>>;

    /// Delete `session` and score the result for `player` in one commit.
    ///
    /// Fails without scoring when the stored session is no longer the one
    /// given. Returns the player's new total on a win.
    async fn finish(
        &self,
        session: &Session,
        player: &Player,
        end: GameEnd,
    ) -> anyhow::Result<Option<i64>>;
}
