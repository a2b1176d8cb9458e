//! Notifications
//!
//! Outcomes that no caller-supplied handler consumes are broadcast to every
//! subscriber over a crossbeam channel. Subscribers that hang up are
//! forgotten on the next emit.

use crossbeam::channel::{unbounded, Receiver, Sender};

/// Something a subscriber may want to know about the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The handshake succeeded
    LoggedIn,

    /// A command finished and no handler was supplied
    Result { result: String, info: String, code: u8 },

    /// Login or command failure, or an engine error
    Error { message: String },

    /// The transport closed; `dropped` queued commands were discarded
    Closed { dropped: usize },
}

/// Fan-out of notifications to subscribers
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one subscriber already attached
    pub fn with_subscriber(subscriber: Sender<Notification>) -> Self {
        Self {
            subscribers: vec![subscriber],
        }
    }

    /// Open a new unbounded subscription
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn add_subscriber(&mut self, subscriber: Sender<Notification>) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn emit(&mut self, notification: Notification) {
        match &notification {
            Notification::Error { message } => tracing::warn!("Session error: {}", message),
            other => tracing::debug!("Notification: {:?}", other),
        }
        self.subscribers
            .retain(|subscriber| subscriber.send(notification.clone()).is_ok());
    }
}
