//! Received-message history.
//!
//! Keeps messages per room in a bounded ring buffer so a long-running
//! chat view has predictable memory use. Arrival order is preserved
//! exactly; nothing is reordered or deduplicated.

use std::collections::{HashMap, VecDeque};

use crate::message::ChatMessage;

/// Configuration for chat history storage.
#[derive(Debug, Clone)]
pub struct ChatHistoryConfig {
    /// Maximum messages to retain per room.
    pub max_messages_per_room: usize,
}

impl Default for ChatHistoryConfig {
    fn default() -> Self {
        Self {
            max_messages_per_room: 500,
        }
    }
}

/// In-memory chat history, keyed by batch id.
pub struct ChatHistory {
    config: ChatHistoryConfig,
    rooms: HashMap<i64, VecDeque<ChatMessage>>,
}

impl ChatHistory {
    pub fn new(config: ChatHistoryConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
        }
    }

    /// Append a message to its room. The oldest message is evicted when the
    /// buffer is full.
    pub fn push(&mut self, msg: ChatMessage) {
        let limit = self.config.max_messages_per_room.max(1);
        let buf = self.rooms.entry(msg.batch_id).or_default();
        if buf.len() >= limit {
            buf.pop_front();
        }
        buf.push_back(msg);
    }

    /// The most recent `limit` messages of a room, oldest first.
    pub fn recent(&self, room_id: i64, limit: usize) -> Vec<&ChatMessage> {
        match self.rooms.get(&room_id) {
            Some(buf) => {
                let skip = buf.len().saturating_sub(limit);
                buf.iter().skip(skip).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn all(&self, room_id: i64) -> Vec<&ChatMessage> {
        match self.rooms.get(&room_id) {
            Some(buf) => buf.iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn clear_room(&mut self, room_id: i64) {
        self.rooms.remove(&room_id);
    }

    pub fn clear_all(&mut self) {
        self.rooms.clear();
    }

    pub fn total_messages(&self) -> usize {
        self.rooms.values().map(|b| b.len()).sum()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(ChatHistoryConfig::default())
    }
}
