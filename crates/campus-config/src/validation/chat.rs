//! Validation for the `[chat]` section.

use crate::schema::CampusConfig;

use super::helpers::validate_range;

pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &CampusConfig) {
    let chat = &config.chat;

    let url = chat.ws_url.trim();
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        errors.push(format!(
            "chat.ws_url = {:?} must start with ws:// or wss://",
            chat.ws_url
        ));
    } else if url.contains('?') {
        errors.push("chat.ws_url must not carry a query string".to_string());
    }

    validate_range(
        errors,
        "chat.reconnect_base_delay_ms",
        chat.reconnect_base_delay_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "chat.max_reconnect_attempts",
        chat.max_reconnect_attempts,
        0,
        20,
    );
    validate_range(
        errors,
        "chat.handshake_timeout_secs",
        chat.handshake_timeout_secs,
        0,
        300,
    );
    validate_range(errors, "chat.history_limit", chat.history_limit, 1, 10_000);
}
