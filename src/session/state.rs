//! Session state
//!
//! [`SessionCore`] owns every piece of per-connection state and is driven
//! purely by events: `on_data`, `on_close` and `execute`. It never reads
//! from the network itself, which keeps it testable without sockets.

use std::collections::VecDeque;

use bytes::Bytes;
use crossbeam::channel::{Receiver, Sender};

use crate::error::{Result, WireError};
use crate::network::Transport;
use crate::protocol::{FrameDecoder, ReadKind};

use super::auth::{self, Credentials};
use super::notify::{Notification, Notifier};
use super::pending::{Continuation, FrameSource, PendingRead};
use super::scheduler::Deferred;

/// Where the connection is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the server's login nonce
    AwaitingNonce,

    /// Credentials sent, waiting for the login status byte
    AwaitingStatus,

    /// Logged in; commands may run
    Ready,

    /// Login rejected; nothing will run on this connection
    AuthFailed,

    /// Transport gone
    Closed,
}

/// Snapshot of the session for observers on other threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: Phase,

    /// A handshake or command is in flight
    pub busy: bool,

    /// Commands waiting for the connection
    pub queued: usize,

    /// Live notification subscriptions
    pub subscribers: usize,
}

impl SessionStatus {
    pub fn connecting() -> Self {
        Self {
            phase: Phase::AwaitingNonce,
            busy: true,
            queued: 0,
            subscribers: 0,
        }
    }
}

/// All state of one connection
pub struct SessionCore {
    pub(super) transport: Box<dyn Transport>,
    pub(super) decoder: FrameDecoder,
    pub(super) pending: PendingRead<SessionCore>,
    pub(super) queue: VecDeque<Deferred>,
    pub(super) notifier: Notifier,
    pub(super) credentials: Credentials,
    pub(super) phase: Phase,
    pub(super) busy: bool,
}

impl SessionCore {
    /// Create the state for a freshly connected transport
    ///
    /// The session starts busy; nothing is sent until [`start`](Self::start).
    pub fn new(
        transport: Box<dyn Transport>,
        credentials: Credentials,
        notifier: Notifier,
        string_capacity: usize,
    ) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::with_capacity(string_capacity),
            pending: PendingRead::new(),
            queue: VecDeque::new(),
            notifier,
            credentials,
            phase: Phase::AwaitingNonce,
            busy: true,
        }
    }

    /// Begin the login handshake
    pub fn start(&mut self) -> Result<()> {
        auth::begin(self)
    }

    /// Feed bytes received from the transport
    ///
    /// Resumes the pending read if the new data completes its frame.
    pub fn on_data(&mut self, chunk: Bytes) -> Result<()> {
        if self.phase == Phase::Closed {
            tracing::debug!("Ignoring {} bytes received after close", chunk.len());
            return Ok(());
        }

        tracing::trace!("Received {} bytes", chunk.len());
        self.decoder.push(chunk);

        while let Some(kind) = self.pending.kind() {
            let Some(frame) = self.decoder.try_read(kind) else {
                break;
            };
            let Some(then) = self.pending.take() else {
                break;
            };
            then(self, frame)?;
        }
        Ok(())
    }

    /// The transport closed: nothing can run any more
    pub fn on_close(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }

        let dropped = self.queue.len();
        self.phase = Phase::Closed;
        self.busy = true;
        self.pending.clear();
        self.queue.clear();

        tracing::info!("Connection closed ({} queued commands dropped)", dropped);
        self.notifier.emit(Notification::Closed { dropped });
    }

    pub fn read_string(&mut self, then: Continuation<Self>) -> Result<()> {
        self.read(ReadKind::String, then)
    }

    pub fn read_byte(&mut self, then: Continuation<Self>) -> Result<()> {
        self.read(ReadKind::Byte, then)
    }

    /// Surface an engine error to subscribers
    pub fn report(&mut self, error: &WireError) {
        self.notifier.emit(Notification::Error {
            message: error.to_string(),
        });
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn add_subscriber(&mut self, subscriber: Sender<Notification>) {
        self.notifier.add_subscriber(subscriber);
    }

    pub(super) fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport.send(bytes)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn has_pending_read(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Bytes received but not yet decoded
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            busy: self.busy,
            queued: self.queue.len(),
            subscribers: self.notifier.subscriber_count(),
        }
    }
}

impl FrameSource for SessionCore {
    fn read(&mut self, kind: ReadKind, then: Continuation<Self>) -> Result<()> {
        if self.phase == Phase::Closed {
            return Err(WireError::Closed);
        }
        match self.decoder.try_read(kind) {
            Some(frame) => then(self, frame),
            None => self.pending.register(kind, then),
        }
    }
}
