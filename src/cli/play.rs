// src/cli/play.rs — Local terminal game loop
//
// Everything typed goes through the same bot the webhook uses, against a
// throwaway in-memory store. `/quit` or EOF ends the loop.

use crate::app::App;
use crate::bot::Inbound;
use crate::game::GameKind;
use crate::infra::config::Config;
use crate::store;

const CONVERSATION: &str = "terminal";
const USER: &str = "local";

pub async fn run_play(config: &Config, kind: Option<&str>) -> anyhow::Result<()> {
    let app = App::build(config, store::in_memory()?)?;
    let name = std::env::var("USER").unwrap_or_else(|_| "لاعب".into());

    eprintln!("majlis v{} (type /help for games, /quit to leave)", env!("CARGO_PKG_VERSION"));

    if let Some(kind) = kind {
        let kind: GameKind = kind.parse().map_err(anyhow::Error::msg)?;
        let trigger = kind.triggers().first().copied().unwrap_or(kind.as_str());
        send(&app, &name, trigger).await?;
    }

    while let Some(line) = read_input() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        send(&app, &name, line).await?;
    }

    app.shutdown();
    Ok(())
}

async fn send(app: &App, name: &str, text: &str) -> anyhow::Result<()> {
    let inbound = Inbound {
        conversation_id: CONVERSATION.into(),
        user_id: USER.into(),
        display_name: Some(name.to_string()),
        text: text.to_string(),
    };
    let reply = app.bot.handle(&inbound).await?;
    match reply.text {
        Some(text) => println!("{text}"),
        None => eprintln!("  (no game running; type /help)"),
    }
    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
