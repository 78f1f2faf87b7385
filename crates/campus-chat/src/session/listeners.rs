//! Ordered listener collections owned by the session task.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::message::ChatMessage;

use super::types::{DisconnectReason, GiveUp};

/// Identifies one registration; unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) type MessageFn = dyn Fn(&ChatMessage) + Send + Sync;
pub(crate) type ConnectFn = dyn Fn() + Send + Sync;
pub(crate) type DisconnectFn = dyn Fn(&DisconnectReason) + Send + Sync;
pub(crate) type GiveUpFn = dyn Fn(&GiveUp) + Send + Sync;

/// A listener of one of the four kinds.
pub(crate) enum Listener {
    Message(Box<MessageFn>),
    Connect(Box<ConnectFn>),
    Disconnect(Box<DisconnectFn>),
    GiveUp(Box<GiveUpFn>),
}

/// Insertion-ordered list; invocation order equals registration order.
pub(crate) struct ListenerList<F: ?Sized> {
    entries: Vec<(ListenerId, Box<F>)>,
}

impl<F: ?Sized> ListenerList<F> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, id: ListenerId, listener: Box<F>) {
        self.entries.push((id, listener));
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn iter(&self) -> impl Iterator<Item = (ListenerId, &F)> {
        self.entries
            .iter()
            .map(|(id, listener)| (*id, listener.as_ref()))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The four listener lists of a session.
pub(crate) struct Listeners {
    pub(crate) message: ListenerList<MessageFn>,
    pub(crate) connect: ListenerList<ConnectFn>,
    pub(crate) disconnect: ListenerList<DisconnectFn>,
    pub(crate) give_up: ListenerList<GiveUpFn>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            message: ListenerList::new(),
            connect: ListenerList::new(),
            disconnect: ListenerList::new(),
            give_up: ListenerList::new(),
        }
    }

    pub(crate) fn register(&mut self, id: ListenerId, listener: Listener) {
        match listener {
            Listener::Message(f) => self.message.push(id, f),
            Listener::Connect(f) => self.connect.push(id, f),
            Listener::Disconnect(f) => self.disconnect.push(id, f),
            Listener::GiveUp(f) => self.give_up.push(id, f),
        }
    }

    /// Remove one registration. Unknown ids (e.g. after a clear) are ignored.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.message.remove(id)
            || self.connect.remove(id)
            || self.disconnect.remove(id)
            || self.give_up.remove(id)
    }

    pub(crate) fn total(&self) -> usize {
        self.message.len() + self.connect.len() + self.disconnect.len() + self.give_up.len()
    }

    pub(crate) fn clear(&mut self) {
        self.message.entries.clear();
        self.connect.entries.clear();
        self.disconnect.entries.clear();
        self.give_up.entries.clear();
    }

    pub(crate) fn emit_message(&self, msg: &ChatMessage) {
        for (id, listener) in self.message.iter() {
            isolate("message", id, || listener(msg));
        }
    }

    pub(crate) fn emit_connect(&self) {
        for (id, listener) in self.connect.iter() {
            isolate("connect", id, listener);
        }
    }

    pub(crate) fn emit_disconnect(&self, reason: &DisconnectReason) {
        for (id, listener) in self.disconnect.iter() {
            isolate("disconnect", id, || listener(reason));
        }
    }

    pub(crate) fn emit_give_up(&self, event: &GiveUp) {
        for (id, listener) in self.give_up.iter() {
            isolate("give_up", id, || listener(event));
        }
    }
}

/// Run one listener; a panic is logged and the remaining listeners still run.
fn isolate(kind: &'static str, id: ListenerId, call: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(call)).is_err() {
        warn!(listener = %id, kind, "Chat listener panicked; skipping it for this event");
    }
}
