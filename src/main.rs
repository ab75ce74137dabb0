// src/main.rs — majlis entry point

use clap::Parser;

use majlis::cli::{play, scores, serve, Cli, Commands};
use majlis::infra::config::Config;
use majlis::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / MAJLIS_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve::run_serve(&config, port).await,
        Commands::Play { kind } => play::run_play(&config, kind.as_deref()).await,
        Commands::Leaderboard { limit } => scores::show_leaderboard(&config, limit).await,
        Commands::Score { user_id } => scores::show_score(&config, &user_id).await,
        Commands::Reset { yes } => scores::run_reset(&config, yes).await,
        Commands::Sweep => scores::run_sweep(&config).await,
        Commands::Kinds => scores::show_kinds(&config),
    }
}
