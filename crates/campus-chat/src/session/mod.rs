//! Per-room chat session manager.
//!
//! [`ChatSession`] is a cheap handle; the channel, the reconnect state and
//! every listener list live in one background task that is their only
//! writer. Handle methods never block and never return errors: outcomes
//! arrive through the registered listeners.

mod actor;
mod client;
mod listeners;
mod types;

pub use client::{ChatSession, Subscription};
pub use listeners::ListenerId;
pub use types::{ChatTarget, DisconnectReason, GiveUp, SessionConfig, SessionState};
