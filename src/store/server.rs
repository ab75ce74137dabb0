// src/store/server.rs — Async message passing for Store
//
// One task owns the SQLite connection. Everything else talks to it through
// a cloneable `StoreHandle`; each command is applied atomically and in the
// order received.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

use super::db::Store;
use crate::game::repository::{GameEnd, SessionStore};
use crate::game::session::{Player, Session};
use crate::ledger::{LeaderboardEntry, ScoreLedger, ScoreRecord};

type Reply<T> = oneshot::Sender<anyhow::Result<T>>;

#[derive(Debug)]
pub enum StoreCommand {
    SaveSession {
        session: Box<Session>,
        resp: Reply<()>,
    },
    LoadSession {
        conversation_id: String,
        resp: Reply<Option<Session>>,
    },
    DeleteSession {
        conversation_id: String,
        resp: Reply<bool>,
    },
    ExpiredSessions {
        now: DateTime<Utc>,
        resp: Reply<Vec<String>>,
    },
    CountSessions {
        resp: Reply<i64>,
    },
    FinishSession {
        conversation_id: String,
        session_id: String,
        player: Player,
        end: GameEnd,
        resp: Reply<Option<i64>>,
    },
    Award {
        user_id: String,
        display_name: String,
        points: u32,
        resp: Reply<i64>,
    },
    RecordLoss {
        user_id: String,
        display_name: String,
        resp: Reply<bool>,
    },
    GetScore {
        user_id: String,
        resp: Reply<Option<ScoreRecord>>,
    },
    Leaderboard {
        limit: u32,
        resp: Reply<Vec<LeaderboardEntry>>,
    },
    ResetScores {
        resp: Reply<usize>,
    },
}

/// A handle to the Store that uses message passing.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> StoreCommand,
    ) -> anyhow::Result<T> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(build(resp_tx))
            .await
            .map_err(|_| anyhow::anyhow!("store task is not running"))?;
        resp_rx.await?
    }

    pub async fn save_session(&self, session: &Session) -> anyhow::Result<()> {
        let session = Box::new(session.clone());
        self.request(|resp| StoreCommand::SaveSession { session, resp })
            .await
    }

    pub async fn load_session(&self, conversation_id: &str) -> anyhow::Result<Option<Session>> {
        let conversation_id = conversation_id.to_string();
        self.request(|resp| StoreCommand::LoadSession {
            conversation_id,
            resp,
        })
        .await
    }

    pub async fn delete_session(&self, conversation_id: &str) -> anyhow::Result<bool> {
        let conversation_id = conversation_id.to_string();
        self.request(|resp| StoreCommand::DeleteSession {
            conversation_id,
            resp,
        })
        .await
    }

    pub async fn expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        self.request(|resp| StoreCommand::ExpiredSessions { now, resp })
            .await
    }

    pub async fn count_sessions(&self) -> anyhow::Result<i64> {
        self.request(|resp| StoreCommand::CountSessions { resp })
            .await
    }

    /// Delete the session and score it as one transaction. Once sent, the
    /// command runs to completion even if the caller stops waiting.
    pub async fn finish_session(
        &self,
        session: &Session,
        player: &Player,
        end: GameEnd,
    ) -> anyhow::Result<Option<i64>> {
        let conversation_id = session.conversation_id.clone();
        let session_id = session.session_id.to_string();
        let player = player.clone();
        self.request(|resp| StoreCommand::FinishSession {
            conversation_id,
            session_id,
            player,
            end,
            resp,
        })
        .await
    }

    pub async fn award(
        &self,
        user_id: &str,
        display_name: &str,
        points: u32,
    ) -> anyhow::Result<i64> {
        let user_id = user_id.to_string();
        let display_name = display_name.to_string();
        self.request(|resp| StoreCommand::Award {
            user_id,
            display_name,
            points,
            resp,
        })
        .await
    }

    pub async fn record_loss(&self, user_id: &str, display_name: &str) -> anyhow::Result<bool> {
        let user_id = user_id.to_string();
        let display_name = display_name.to_string();
        self.request(|resp| StoreCommand::RecordLoss {
            user_id,
            display_name,
            resp,
        })
        .await
    }

    pub async fn get_score(&self, user_id: &str) -> anyhow::Result<Option<ScoreRecord>> {
        let user_id = user_id.to_string();
        self.request(|resp| StoreCommand::GetScore { user_id, resp })
            .await
    }

    pub async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        self.request(|resp| StoreCommand::Leaderboard { limit, resp })
            .await
    }

    pub async fn reset_scores(&self) -> anyhow::Result<usize> {
        self.request(|resp| StoreCommand::ResetScores { resp })
            .await
    }
}

/// Helper to spawn the store server and return a handle.
pub fn spawn_store_server(store: Store) -> (StoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = StoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::SaveSession { session, resp } => {
                let _ = resp.send(store.save_session(&session));
            }
            StoreCommand::LoadSession {
                conversation_id,
                resp,
            } => {
                let _ = resp.send(store.load_session(&conversation_id));
            }
            StoreCommand::DeleteSession {
                conversation_id,
                resp,
            } => {
                let _ = resp.send(store.delete_session(&conversation_id));
            }
            StoreCommand::ExpiredSessions { now, resp } => {
                let _ = resp.send(store.expired_sessions(now));
            }
            StoreCommand::CountSessions { resp } => {
                let _ = resp.send(store.count_sessions());
            }
            StoreCommand::FinishSession {
                conversation_id,
                session_id,
                player,
                end,
                resp,
            } => {
                let _ = resp.send(store.finish_session(
                    &conversation_id,
                    &session_id,
                    &player,
                    end,
                ));
            }
            StoreCommand::Award {
                user_id,
                display_name,
                points,
                resp,
            } => {
                let _ = resp.send(store.award(&user_id, &display_name, points));
            }
            StoreCommand::RecordLoss {
                user_id,
                display_name,
                resp,
            } => {
                let _ = resp.send(store.record_loss(&user_id, &display_name));
            }
            StoreCommand::GetScore { user_id, resp } => {
                let _ = resp.send(store.get_score(&user_id));
            }
            StoreCommand::Leaderboard { limit, resp } => {
                let _ = resp.send(store.leaderboard(limit));
            }
            StoreCommand::ResetScores { resp } => {
                let _ = resp.send(store.reset_scores());
            }
        }
    }
    tracing::debug!("Store server stopped");
}

#[async_trait]
impl SessionStore for StoreHandle {
    async fn load(&self, conversation_id: &str) -> anyhow::Result<Option<Session>> {
        self.load_session(conversation_id).await
    }

    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.save_session(session).await
    }

    async fn remove(&self, conversation_id: &str) -> anyhow::Result<bool> {
        self.delete_session(conversation_id).await
    }

    async fn expired(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        self.expired_sessions(now).await
    }

    async fn finish(
        &self,
        session: &Session,
        player: &Player,
        end: GameEnd,
    ) -> anyhow::Result<Option<i64>> {
        self.finish_session(session, player, end).await
    }
}

#[async_trait]
impl ScoreLedger for StoreHandle {
    async fn award(&self, user_id: &str, display_name: &str, points: u32) -> anyhow::Result<i64> {
        StoreHandle::award(self, user_id, display_name, points).await
    }

    async fn record_loss(&self, user_id: &str, display_name: &str) -> anyhow::Result<()> {
        StoreHandle::record_loss(self, user_id, display_name).await?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> anyhow::Result<Option<ScoreRecord>> {
        self.get_score(user_id).await
    }

    async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        StoreHandle::leaderboard(self, limit).await
    }

    async fn reset_all(&self) -> anyhow::Result<usize> {
        self.reset_scores().await
    }
}
