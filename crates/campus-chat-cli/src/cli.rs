use std::path::PathBuf;

use clap::Parser;

/// Terminal client for a batch's live group chat.
#[derive(Parser, Debug)]
#[command(name = "campus-chat", version, about)]
pub struct Args {
    /// Batch whose chat room to join.
    #[arg(short, long)]
    pub batch: i64,

    /// Access token for the chat endpoint.
    #[arg(long, env = "CAMPUS_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Chat server base URL override (ws:// or wss://).
    #[arg(long)]
    pub url: Option<String>,

    /// Your user id; your own messages are shown as "you".
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
