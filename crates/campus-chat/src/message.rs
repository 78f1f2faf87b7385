//! Wire types exchanged with the chat endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as delivered by the server, one per inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier. Opaque; never compared numerically.
    pub id: String,
    pub batch_id: i64,
    pub user_id: i64,
    pub user_name: String,
    /// Free-form role label (admin, mentor, student, ...).
    pub user_role: String,
    pub message: String,
    /// ISO-8601 instant of server receipt.
    pub timestamp: String,
}

impl ChatMessage {
    /// Parse a single inbound text frame.
    pub fn from_frame(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The server receipt time, if `timestamp` is valid RFC 3339.
    ///
    /// Some servers omit the offset; those values are read as UTC.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Outbound frame body: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage<'a> {
    pub message: &'a str,
}

impl<'a> OutboundMessage<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
