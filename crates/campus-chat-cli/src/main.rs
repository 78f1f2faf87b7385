//! campus-chat: terminal client for a batch's live group chat.
//!
//! Joins one batch room over WebSocket, prints incoming messages, and sends
//! each line typed at the prompt. Reconnects with exponential backoff when
//! the channel drops.

mod cli;
mod input;
mod render;
mod view;

use std::process::ExitCode;
use std::time::Duration;

use campus_chat::{ChatHistory, ChatHistoryConfig, ChatSession, SessionConfig, WsConnector};
use campus_common::CampusError;
use campus_config::{CampusConfig, ChatConfig};

use crate::cli::Args;
use crate::view::ChatView;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("campus-chat: {e}");
            return ExitCode::FAILURE;
        }
    };

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_directive().to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directive.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "campus-chat exited with error");
            eprintln!("campus-chat: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> campus_common::Result<CampusConfig> {
    let mut config = match &args.config {
        Some(path) => campus_config::load_config_from(path)?,
        None => campus_config::load_config()?,
    };
    if let Some(url) = &args.url {
        config.chat.ws_url = url.clone();
        campus_config::validation::validate(&config)?;
    }
    Ok(config)
}

/// Map the `[chat]` config section onto session settings.
fn session_config(chat: &ChatConfig) -> SessionConfig {
    SessionConfig {
        base_url: chat.ws_url.clone(),
        reconnect_base_delay: Duration::from_millis(u64::from(chat.reconnect_base_delay_ms)),
        max_reconnect_attempts: chat.max_reconnect_attempts,
    }
}

fn connector(chat: &ChatConfig) -> WsConnector {
    let timeout = (chat.handshake_timeout_secs > 0)
        .then(|| Duration::from_secs(u64::from(chat.handshake_timeout_secs)));
    WsConnector::new().with_handshake_timeout(timeout)
}

fn require_token(token: Option<String>) -> campus_common::Result<String> {
    match token.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(CampusError::Auth(
            "pass --token or set CAMPUS_ACCESS_TOKEN".to_string(),
        )),
    }
}

async fn run(args: Args, config: CampusConfig) -> campus_common::Result<()> {
    let token = require_token(args.token)?;

    tracing::info!(
        room_id = args.batch,
        base_url = %config.chat.ws_url,
        max_attempts = config.chat.max_reconnect_attempts,
        "Starting chat client"
    );

    let session = ChatSession::new(session_config(&config.chat), connector(&config.chat));
    let history = ChatHistory::new(ChatHistoryConfig {
        max_messages_per_room: config.chat.history_limit as usize,
    });

    ChatView::new(session, args.batch, token, args.user_id, history)
        .run()
        .await
}
