// src/cli/mod.rs — CLI definition (clap derive)

pub mod play;
pub mod scores;
pub mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "majlis", about = "Arabic word games for group chats", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the webhook API and the expiry sweeper (default)
    Serve {
        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Play in the terminal against an in-memory store
    Play {
        /// Game to start right away (chain, riddle, scramble, ...)
        kind: Option<String>,
    },
    /// Show the leaderboard
    Leaderboard {
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Show one player's score
    Score { user_id: String },
    /// Erase every score
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Remove expired sessions once and exit
    Sweep,
    /// List game kinds with their triggers and content counts
    Kinds,
}
