//! Plain-text rendering of chat messages and connection status.

use campus_chat::{ChatMessage, DisconnectReason, GiveUp};
use chrono::Local;

/// Up to two uppercase initials from a display name, `?` when empty.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Bracketed role tag; unknown roles are shown as given.
pub fn role_tag(role: &str) -> String {
    match role.to_lowercase().as_str() {
        "admin" => "[ADMIN]".to_string(),
        "mentor" => "[MENTOR]".to_string(),
        "student" => "[STUDENT]".to_string(),
        "" => String::new(),
        _ => format!("[{role}]"),
    }
}

/// Local `HH:MM` of the server timestamp, or `--:--` if it does not parse.
pub fn clock(msg: &ChatMessage) -> String {
    msg.sent_at()
        .map(|ts| ts.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

pub fn message_line(msg: &ChatMessage, own_user_id: Option<i64>) -> String {
    if own_user_id == Some(msg.user_id) {
        return format!("[{}] you: {}", clock(msg), msg.message);
    }
    let tag = role_tag(&msg.user_role);
    let sender = if tag.is_empty() {
        format!("({}) {}", initials(&msg.user_name), msg.user_name)
    } else {
        format!("({}) {} {}", initials(&msg.user_name), msg.user_name, tag)
    };
    format!("[{}] {}: {}", clock(msg), sender, msg.message)
}

pub fn connected_line(room_id: i64) -> String {
    format!("-- Connected to batch {room_id} --")
}

pub fn disconnected_line(reason: &DisconnectReason) -> String {
    format!("-- Disconnected ({reason}) --")
}

pub fn gave_up_line(event: &GiveUp) -> String {
    format!(
        "-- Gave up reconnecting to batch {} after {} attempts; type /reconnect to retry --",
        event.room_id, event.attempts
    )
}
