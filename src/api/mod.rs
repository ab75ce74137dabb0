// src/api/mod.rs — HTTP surface: message webhook and score reads

pub mod auth;
pub mod handlers;
pub mod types;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::bot::Bot;
use crate::infra::config::ServerConfig;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub bot: Arc<Bot>,
    pub token: Option<String>,
    pub leaderboard_size: u32,
}

impl ApiState {
    pub fn new(bot: Arc<Bot>, config: &ServerConfig) -> Self {
        Self {
            bot,
            token: config.token.clone().filter(|t| !t.is_empty()),
            leaderboard_size: config.leaderboard_size,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/v1/messages", post(handlers::handle_message))
        .route("/api/v1/leaderboard", get(handlers::leaderboard))
        .route("/api/v1/scores/{user_id}", get(handlers::get_score))
        .route("/api/v1/health", get(handlers::health))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: ApiState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
