// src/store/db.rs — SQLite operations

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::game::repository::GameEnd;
use crate::game::session::{Player, Session};
use crate::ledger::{LeaderboardEntry, ScoreRecord};

/// Fixed-width UTC timestamps so text comparison orders them.
pub fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Low-level SQLite operations for sessions and scores.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // -- Sessions --

    /// Insert or replace the session for its conversation.
    pub fn save_session(&self, session: &Session) -> anyhow::Result<()> {
        let payload = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO sessions (conversation_id, session_id, game_kind, payload, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(conversation_id) DO UPDATE SET
                session_id = excluded.session_id,
                game_kind = excluded.game_kind,
                payload = excluded.payload,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![
                session.conversation_id,
                session.session_id.to_string(),
                session.game_kind.as_str(),
                payload,
                timestamp(session.created_at),
                timestamp(session.expires_at),
            ],
        )?;
        Ok(())
    }

    pub fn load_session(&self, conversation_id: &str) -> anyhow::Result<Option<Session>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM sessions WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    pub fn delete_session(&self, conversation_id: &str) -> anyhow::Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM sessions WHERE conversation_id = ?1",
            params![conversation_id],
        )?;
        Ok(n > 0)
    }

    /// Conversations whose session expired at or before `now`.
    pub fn expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT conversation_id FROM sessions
             WHERE expires_at <= ?1
             ORDER BY expires_at ASC",
        )?;
        let rows = stmt.query_map(params![timestamp(now)], |row| row.get(0))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_sessions(&self) -> anyhow::Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?;
        Ok(count)
    }

    // -- Scores --

    /// Credit a win. Returns the new total.
    pub fn award(&self, user_id: &str, display_name: &str, points: u32) -> anyhow::Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let total = credit_win(&tx, user_id, display_name, points)?;
        tx.commit()?;
        Ok(total)
    }

    /// Count a lost game. Users without a record are left alone.
    pub fn record_loss(&self, user_id: &str, display_name: &str) -> anyhow::Result<bool> {
        count_loss(&self.conn, user_id, display_name)
    }

    /// End a session and score it in the same transaction.
    ///
    /// Nothing is written unless the row for `conversation_id` still holds
    /// `session_id`.
    pub fn finish_session(
        &self,
        conversation_id: &str,
        session_id: &str,
        player: &Player,
        end: GameEnd,
    ) -> anyhow::Result<Option<i64>> {
        let tx = self.conn.unchecked_transaction()?;
        let deleted = tx.execute(
            "DELETE FROM sessions WHERE conversation_id = ?1 AND session_id = ?2",
            params![conversation_id, session_id],
        )?;
        if deleted == 0 {
            anyhow::bail!("session {session_id} in {conversation_id} is no longer live");
        }
        let total = match end {
            GameEnd::Won { points } => {
                Some(credit_win(&tx, &player.user_id, &player.display_name, points)?)
            }
            GameEnd::Lost => {
                count_loss(&tx, &player.user_id, &player.display_name)?;
                None
            }
        };
        tx.commit()?;
        Ok(total)
    }

    pub fn get_score(&self, user_id: &str) -> anyhow::Result<Option<ScoreRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT user_id, display_name, total_points, games_played, wins, created_at, updated_at
                 FROM scores WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(ScoreRecord {
                        user_id: row.get(0)?,
                        display_name: row.get(1)?,
                        total_points: row.get(2)?,
                        games_played: row.get(3)?,
                        wins: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Points descending, ties broken by creation order.
    pub fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, display_name, total_points
             FROM scores
             ORDER BY total_points DESC, rowid ASC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut result = Vec::new();
        for (i, row) in rows.enumerate() {
            let (user_id, display_name, points) = row?;
            result.push(LeaderboardEntry {
                rank: i as u32 + 1,
                user_id,
                display_name,
                points,
            });
        }
        Ok(result)
    }

    pub fn reset_scores(&self) -> anyhow::Result<usize> {
        let n = self.conn.execute("DELETE FROM scores", [])?;
        Ok(n)
    }
}

fn credit_win(
    conn: &Connection,
    user_id: &str,
    display_name: &str,
    points: u32,
) -> anyhow::Result<i64> {
    let now = timestamp(Utc::now());
    conn.execute(
        "INSERT INTO scores (user_id, display_name, total_points, games_played, wins, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, 1, ?4, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            display_name = excluded.display_name,
            total_points = total_points + excluded.total_points,
            games_played = games_played + 1,
            wins = wins + 1,
            updated_at = excluded.updated_at",
        params![user_id, display_name, points as i64, now],
    )?;
    let total = conn.query_row(
        "SELECT total_points FROM scores WHERE user_id = ?1",
        params![user_id],
        |r| r.get(0),
    )?;
    Ok(total)
}

fn count_loss(conn: &Connection, user_id: &str, display_name: &str) -> anyhow::Result<bool> {
    let now = timestamp(Utc::now());
    let n = conn.execute(
        "UPDATE scores SET games_played = games_played + 1,
         display_name = ?2, updated_at = ?3
         WHERE user_id = ?1",
        params![user_id, display_name, now],
    )?;
    Ok(n > 0)
}
