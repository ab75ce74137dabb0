// src/sweeper.rs — Periodic expiry sweep

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::game::SessionManager;

/// Run `expire_sweep` every `interval` until the task is aborted.
pub fn spawn_sweeper(manager: Arc<SessionManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let now = manager.now();
            if let Err(e) = manager.expire_sweep(now).await {
                tracing::warn!("Expiry sweep failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::app::App;
    use crate::game::{GameKind, ManualClock, Player};
    use crate::infra::config::Config;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_sessions_on_tick() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap(),
        ));
        let app = App::build_with(
            &Config::default(),
            crate::store::in_memory().unwrap(),
            Vec::new(),
            Some(clock.clone()),
        )
        .unwrap();
        let player = Player::new("u1", "سارة");
        app.manager
            .start("group-1", &player, GameKind::FastType)
            .await
            .unwrap();
        app.manager
            .start("group-2", &player, GameKind::Chain)
            .await
            .unwrap();
        // Fast typing lives 30 seconds, chains 180.
        clock.advance(chrono::Duration::seconds(31));

        let sweeper = spawn_sweeper(app.manager.clone(), Duration::from_secs(5));
        // Nothing happens before the first interval.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(app.store.count_sessions().await.unwrap(), 2);

        tokio::time::sleep(Duration::from_secs(4)).await;
        sweeper.abort();

        assert_eq!(app.store.count_sessions().await.unwrap(), 1);
        assert!(app.store.load_session("group-1").await.unwrap().is_none());
        assert!(app.store.load_session("group-2").await.unwrap().is_some());
    }
}
