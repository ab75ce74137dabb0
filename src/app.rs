// src/app.rs — Wiring: store, catalog, verifier, manager, bot

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::bot::Bot;
use crate::catalog::content::ContentPack;
use crate::catalog::ContentCatalog;
use crate::game::clock::Clock;
use crate::game::SessionManager;
use crate::infra::config::Config;
use crate::provider::{resolver, ModelProvider};
use crate::store::{spawn_store_server, Store, StoreHandle};
use crate::verify::{AiVerifier, AnswerVerifier, DeterministicVerifier};

/// Everything a front end (HTTP server or terminal) needs.
pub struct App {
    pub bot: Arc<Bot>,
    pub manager: Arc<SessionManager>,
    pub store: StoreHandle,
    store_task: tokio::task::JoinHandle<()>,
}

impl App {
    /// Build from config, discovering model providers from the environment.
    pub fn build(config: &Config, store: Store) -> anyhow::Result<Self> {
        Self::build_with(config, store, resolver::providers_from_env(), None)
    }

    /// Build with explicit providers and, optionally, a fixed clock.
    pub fn build_with(
        config: &Config,
        store: Store,
        providers: Vec<Arc<dyn ModelProvider>>,
        clock: Option<Arc<dyn Clock>>,
    ) -> anyhow::Result<Self> {
        let catalog = Arc::new(load_catalog(config)?);
        let verifier = build_verifier(config, providers);
        let (handle, store_task) = spawn_store_server(store);

        let mut manager = SessionManager::new(
            Arc::new(handle.clone()),
            catalog,
            verifier,
            Arc::new(handle.clone()),
            config.games.clone(),
        );
        if let Some(clock) = clock {
            manager = manager.with_clock(clock);
        }
        let manager = Arc::new(manager);
        let bot = Arc::new(Bot::new(manager.clone(), config.server.leaderboard_size));

        Ok(Self {
            bot,
            manager,
            store: handle,
            store_task,
        })
    }

    /// Stop the store task. Pending commands already queued are dropped.
    pub fn shutdown(self) {
        self.store_task.abort();
    }
}

/// Built-in content plus the configured content file, if any.
pub fn load_catalog(config: &Config) -> anyhow::Result<ContentCatalog> {
    let mut pack = ContentPack::builtin();
    if let Some(path) = config.catalog.resolved_path() {
        let extra = ContentPack::load(&path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        tracing::info!("Loaded extra content from {}", path.display());
        pack.merge(extra);
    }
    Ok(ContentCatalog::new(pack).with_points(&config.games))
}

/// AI-assisted when enabled and a provider is reachable, exact rules otherwise.
pub fn build_verifier(
    config: &Config,
    providers: Vec<Arc<dyn ModelProvider>>,
) -> Arc<dyn AnswerVerifier> {
    if !config.verifier.enabled {
        return Arc::new(DeterministicVerifier);
    }
    match resolver::verifier_chain(&config.verifier, providers) {
        Some(chain) => {
            tracing::info!("Semantic answer checks enabled");
            Arc::new(AiVerifier::new(
                Arc::new(chain),
                Duration::from_secs(config.verifier.timeout_secs.max(1)),
            ))
        }
        None => {
            tracing::warn!("Verifier enabled but no provider key found; using exact rules");
            Arc::new(DeterministicVerifier)
        }
    }
}
