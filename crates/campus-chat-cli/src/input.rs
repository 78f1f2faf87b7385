//! Parsing of lines typed at the chat prompt.

/// Replayed by `/history` when no count is given.
pub const DEFAULT_HISTORY_COUNT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing to do (blank line).
    Empty,
    /// Chat text to send, already trimmed.
    Say(String),
    /// Replay the last n messages of the room.
    History(usize),
    /// Join the room again after giving up.
    Reconnect,
    Quit,
    /// Slash command we don't know, or bad arguments.
    Unknown(String),
}

pub fn parse(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Say(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("quit" | "exit"), None, None) => Input::Quit,
        (Some("reconnect"), None, None) => Input::Reconnect,
        (Some("history"), None, None) => Input::History(DEFAULT_HISTORY_COUNT),
        (Some("history"), Some(n), None) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::History(n),
            _ => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}
