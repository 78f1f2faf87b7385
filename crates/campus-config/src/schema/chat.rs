//! Batch chat connection settings.

use serde::{Deserialize, Serialize};

/// Chat client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base WebSocket URL of the chat server (`ws://` or `wss://`).
    pub ws_url: String,
    /// First reconnect delay in milliseconds; doubles on each attempt (valid range: 100-60000).
    pub reconnect_base_delay_ms: u32,
    /// Reconnect attempts before giving up (valid range: 0-20).
    pub max_reconnect_attempts: u32,
    /// Handshake timeout in seconds, 0 disables it (valid range: 0-300).
    pub handshake_timeout_secs: u32,
    /// Messages kept per room for `/history` (valid range: 1-10000).
    pub history_limit: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000".into(),
            reconnect_base_delay_ms: 1000,
            max_reconnect_attempts: 5,
            handshake_timeout_secs: 0,
            history_limit: 500,
        }
    }
}
