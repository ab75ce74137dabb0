// src/ledger/mod.rs — Durable per-user points

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One user's cumulative record. Created on the first award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user_id: String,
    pub display_name: String,
    pub total_points: i64,
    pub games_played: i64,
    pub wins: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub points: i64,
}

/// Point accumulation and ranking.
///
/// Totals only grow; the sole way down is `reset_all`.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Add a win worth `points`, creating the record if absent. Returns the new total.
    async fn award(&self, user_id: &str, display_name: &str, points: u32) -> anyhow::Result<i64>;

    /// Count a lost game for a user who already has a record.
    async fn record_loss(&self, user_id: &str, display_name: &str) -> anyhow::Result<()>;

    async fn get(&self, user_id: &str) -> anyhow::Result<Option<ScoreRecord>>;

    /// Highest totals first; ties keep creation order.
    async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>>;

    /// Delete every record. Returns how many were removed.
    async fn reset_all(&self) -> anyhow::Result<usize>;
}

/// Render a leaderboard as chat text.
pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    use crate::game::normalize::to_arabic_digits;

    if entries.is_empty() {
        return "لا توجد نقاط بعد.".to_string();
    }
    let mut out = String::from("🏆 لوحة الصدارة");
    for e in entries {
        let medal = match e.rank {
            1 => "🥇",
            2 => "🥈",
            3 => "🥉",
            _ => "▫️",
        };
        out.push_str(&format!(
            "\n{medal} {}. {}: {}",
            to_arabic_digits(e.rank as i64),
            e.display_name,
            to_arabic_digits(e.points)
        ));
    }
    out
}
