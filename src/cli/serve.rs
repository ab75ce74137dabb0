// src/cli/serve.rs — Long-running webhook server

use std::time::Duration;

use crate::api::{self, ApiState};
use crate::app::App;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::store;
use crate::sweeper::spawn_sweeper;

pub async fn run_serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let mut server = config.server.clone();
    if let Some(port) = port {
        server.port = port;
    }

    paths::ensure_dirs().await?;
    let db_path = config.store.resolved_path();
    let app = App::build(config, store::open(&db_path)?)?;
    tracing::info!("Using database {}", db_path.display());

    let sweeper = spawn_sweeper(
        app.manager.clone(),
        Duration::from_secs(config.games.sweep_interval_secs),
    );

    if server.token.is_none() {
        eprintln!("  warning: no [server] token set; the API accepts any caller");
    }

    let state = ApiState::new(app.bot.clone(), &server);
    let result = api::start_server(&server, state, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down");
    })
    .await;

    sweeper.abort();
    app.shutdown();
    result
}
