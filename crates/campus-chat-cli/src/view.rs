//! The interactive chat loop: session events in, stdin lines out.

use campus_chat::{ChatHistory, ChatMessage, ChatSession, DisconnectReason, GiveUp, Subscription};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::input::{self, Input};
use crate::render;

/// Session events forwarded from listener callbacks to the view loop.
#[derive(Debug)]
enum ViewEvent {
    Message(ChatMessage),
    Connected,
    Disconnected(DisconnectReason),
    GaveUp(GiveUp),
}

pub struct ChatView {
    session: ChatSession,
    room_id: i64,
    token: String,
    own_user_id: Option<i64>,
    history: ChatHistory,
    events: mpsc::UnboundedReceiver<ViewEvent>,
    subscriptions: Vec<Subscription>,
}

impl ChatView {
    pub fn new(
        session: ChatSession,
        room_id: i64,
        token: String,
        own_user_id: Option<i64>,
        history: ChatHistory,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        let subscriptions = vec![
            {
                let tx = tx.clone();
                session.on_message(move |msg: &ChatMessage| {
                    let _ = tx.send(ViewEvent::Message(msg.clone()));
                })
            },
            {
                let tx = tx.clone();
                session.on_connect(move || {
                    let _ = tx.send(ViewEvent::Connected);
                })
            },
            {
                let tx = tx.clone();
                session.on_disconnect(move |reason: &DisconnectReason| {
                    let _ = tx.send(ViewEvent::Disconnected(reason.clone()));
                })
            },
            session.on_give_up(move |event: &GiveUp| {
                let _ = tx.send(ViewEvent::GaveUp(*event));
            }),
        ];

        Self {
            session,
            room_id,
            token,
            own_user_id,
            history,
            events,
            subscriptions,
        }
    }

    /// Join the room and run until `/quit`, Ctrl-C, or end of input.
    pub async fn run(mut self) -> campus_common::Result<()> {
        println!("Joining batch {}... (/history [n], /reconnect, /quit)", self.room_id);
        self.session.connect(self.room_id, self.token.clone());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.on_event(event),
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if !self.on_input(&line) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            }
        }

        self.leave();
        Ok(())
    }

    fn on_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Message(msg) => {
                println!("{}", render::message_line(&msg, self.own_user_id));
                self.history.push(msg);
            }
            ViewEvent::Connected => println!("{}", render::connected_line(self.room_id)),
            ViewEvent::Disconnected(reason) => println!("{}", render::disconnected_line(&reason)),
            ViewEvent::GaveUp(event) => println!("{}", render::gave_up_line(&event)),
        }
    }

    /// Returns false when the user asked to leave.
    fn on_input(&mut self, line: &str) -> bool {
        match input::parse(line) {
            Input::Empty => {}
            Input::Say(text) => {
                if self.session.is_connected() {
                    self.session.send_message(text);
                } else {
                    println!("-- Not connected; message not sent --");
                }
            }
            Input::History(n) => {
                let recent = self.history.recent(self.room_id, n);
                if recent.is_empty() {
                    println!("-- No messages yet --");
                }
                for msg in recent {
                    println!("{}", render::message_line(msg, self.own_user_id));
                }
            }
            Input::Reconnect => self.session.connect(self.room_id, self.token.clone()),
            Input::Quit => return false,
            Input::Unknown(cmd) => println!("-- Unknown command: {cmd} --"),
        }
        true
    }

    fn leave(self) {
        for sub in self.subscriptions {
            sub.unsubscribe();
        }
        self.session.disconnect();
        tracing::info!(room_id = self.room_id, "Left chat");
    }
}
