// src/cli/scores.rs — Leaderboard, score lookup, reset, sweep, kinds

use crate::app::{load_catalog, App};
use crate::game::normalize::to_arabic_digits;
use crate::game::GameKind;
use crate::infra::config::Config;
use crate::ledger::format_leaderboard;
use crate::store;

fn open_app(config: &Config) -> anyhow::Result<App> {
    let path = config.store.resolved_path();
    if !path.exists() {
        anyhow::bail!("No database at {} (run `majlis serve` first)", path.display());
    }
    App::build_with(config, store::open(&path)?, Vec::new(), None)
}

pub async fn show_leaderboard(config: &Config, limit: Option<u32>) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let limit = limit.unwrap_or(config.server.leaderboard_size).clamp(1, 100);
    let entries = app.store.leaderboard(limit).await?;
    println!("{}", format_leaderboard(&entries));
    app.shutdown();
    Ok(())
}

pub async fn show_score(config: &Config, user_id: &str) -> anyhow::Result<()> {
    let app = open_app(config)?;
    match app.store.get_score(user_id).await? {
        Some(r) => {
            println!("{} ({})", r.display_name, r.user_id);
            println!("  Points:  {}", r.total_points);
            println!("  Wins:    {} of {} games", r.wins, r.games_played);
            println!("  Since:   {}", r.created_at.get(..10).unwrap_or(r.created_at.as_str()));
        }
        None => println!("No score recorded for {user_id}"),
    }
    app.shutdown();
    Ok(())
}

pub async fn run_reset(config: &Config, yes: bool) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let confirmed = yes
        || inquire::Confirm::new("Erase every player's score?")
            .with_default(false)
            .with_help_message("Running games are not affected")
            .prompt()
            .unwrap_or(false);

    if confirmed {
        let removed = app.store.reset_scores().await?;
        println!("Removed {removed} score record(s).");
    } else {
        println!("Nothing changed.");
    }
    app.shutdown();
    Ok(())
}

pub async fn run_sweep(config: &Config) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let removed = app.manager.expire_sweep(app.manager.now()).await?;
    println!("Removed {removed} expired session(s).");
    app.shutdown();
    Ok(())
}

pub fn show_kinds(config: &Config) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let pack = catalog.pack();
    for kind in GameKind::ALL {
        let rules = kind.rules(&config.games);
        let count = match kind {
            GameKind::Chain => Some(pack.chain_seeds.len()),
            GameKind::Riddle => Some(pack.riddles.len()),
            GameKind::Quiz => Some(pack.quiz.len()),
            GameKind::Scramble => Some(pack.scramble.len()),
            GameKind::FastType => Some(pack.fast_type.len()),
            GameKind::Letters => Some(pack.letters.len()),
            GameKind::Math => None,
        };
        let content = match count {
            Some(n) => format!("{n} item(s)"),
            None => "generated".to_string(),
        };
        println!(
            "  {:<10} {:<14} ttl {:>4}s  {:<12} {}",
            kind.as_str(),
            kind.display_name(),
            rules.ttl().num_seconds(),
            content,
            kind.triggers().join(" / ")
        );
    }
    println!();
    println!(
        "  Default session lifetime: {} ثانية",
        to_arabic_digits(config.games.default_ttl_secs as i64)
    );
    Ok(())
}
