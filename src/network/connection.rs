//! Client Connection
//!
//! A live session over TCP.
//!
//! ```text
//!  socket ──read──► [reader thread] ──Event::Data──┐
//!                                                   ▼
//!  Session::execute ───────Event::Execute────► [actor thread] ──► SessionCore
//!  Session::subscribe ─────Event::Subscribe───┘       │
//!                                                      └──► notifications
//! ```
//!
//! The actor is the only thread that touches the engine state, so events are
//! handled strictly one after another in arrival order.

use std::io::{ErrorKind, Read};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;

use super::transport::TcpTransport;
use crate::config::Config;
use crate::error::{Result, WireError};
use crate::protocol::Reply;
use crate::session::{
    Completion, Credentials, Handler, Notification, Notifier, Phase, SessionCore, SessionStatus,
};

/// Input to the actor thread
enum Event {
    /// Bytes read from the socket
    Data(Bytes),

    /// The socket reached EOF or failed
    Closed,

    /// A caller wants a command run
    Execute {
        command: String,
        completion: Completion,
    },

    /// A caller wants notifications
    Subscribe(Sender<Notification>),

    /// The handle is going away
    Shutdown,
}

/// Handle to a connected, logging-in or logged-in session
pub struct Session {
    /// Event queue of the actor thread
    events: Sender<Event>,

    /// Published by the actor after every event
    status: Arc<RwLock<SessionStatus>>,

    /// Kept to shut the socket down on close
    stream: TcpStream,

    /// Reader and actor threads
    workers: Vec<JoinHandle<()>>,

    /// Peer address for logging
    peer_addr: String,

    query_timeout: Option<Duration>,
}

impl Session {
    /// Connect and start the login handshake
    ///
    /// Returns as soon as the socket is up. Commands issued before the
    /// handshake finishes are queued and run once logged in. No
    /// notifications are kept unless someone subscribes.
    pub fn connect(config: Config) -> Result<Self> {
        Self::open(config, Notifier::new())
    }

    /// Like [`connect`](Self::connect), with a subscription that sees
    /// everything from the start of the handshake
    ///
    /// Dropping the receiver ends the subscription.
    pub fn connect_with_notifications(config: Config) -> Result<(Self, Receiver<Notification>)> {
        let (tx, rx) = unbounded();
        let session = Self::open(config, Notifier::with_subscriber(tx))?;
        Ok((session, rx))
    }

    fn open(config: Config, notifier: Notifier) -> Result<Self> {
        config.validate()?;

        let stream = open_stream(&config)?;
        stream.set_nodelay(config.nodelay)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr());
        tracing::info!("Connected to {}", peer_addr);

        let (events_tx, events_rx) = unbounded();
        let status = Arc::new(RwLock::new(SessionStatus::connecting()));

        let core = SessionCore::new(
            Box::new(TcpTransport::new(stream.try_clone()?)),
            Credentials::new(config.username.clone(), config.password.clone()),
            notifier,
            config.initial_string_capacity,
        );

        let reader = {
            let stream = stream.try_clone()?;
            let events = events_tx.clone();
            let buffer_size = config.read_buffer_size;
            thread::Builder::new()
                .name("xqwire-reader".to_string())
                .spawn(move || read_loop(stream, buffer_size, events))?
        };

        let actor = {
            let status = Arc::clone(&status);
            thread::Builder::new()
                .name("xqwire-session".to_string())
                .spawn(move || run_actor(core, events_rx, status))?
        };

        Ok(Self {
            events: events_tx,
            status,
            stream,
            workers: vec![reader, actor],
            peer_addr,
            query_timeout: config.query_timeout(),
        })
    }

    /// Run `command`; `handler(result, info)` is called on success only
    ///
    /// Without a handler the outcome arrives as `Notification::Result`.
    /// Failures always arrive as `Notification::Error`.
    pub fn execute(&self, command: impl Into<String>, handler: Option<Handler>) -> Result<()> {
        self.submit(command.into(), Completion::from(handler))
    }

    /// Run `command` and wait for its reply
    ///
    /// Waits forever unless `query_timeout_ms` is configured; a timeout stops
    /// the wait but the command stays in flight on the connection.
    pub fn query(&self, command: impl Into<String>) -> Result<Reply> {
        let command = command.into();
        let (tx, rx) = bounded(1);
        self.submit(command.clone(), Completion::Reply(tx))?;

        match self.query_timeout {
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => Err(WireError::Timeout(format!(
                    "no reply to '{}' after {}ms",
                    command,
                    timeout.as_millis()
                ))),
                Err(RecvTimeoutError::Disconnected) => Err(WireError::Closed),
            },
            None => rx.recv().unwrap_or(Err(WireError::Closed)),
        }
    }

    /// Open a new subscription; only sees notifications emitted from now on
    pub fn subscribe(&self) -> Result<Receiver<Notification>> {
        let (tx, rx) = unbounded();
        self.events
            .send(Event::Subscribe(tx))
            .map_err(|_| WireError::Closed)?;
        Ok(rx)
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.read()
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Shut the socket down and wait for the worker threads
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn submit(&self, command: String, completion: Completion) -> Result<()> {
        if self.status.read().phase == Phase::Closed {
            return Err(WireError::Closed);
        }
        self.events
            .send(Event::Execute {
                command,
                completion,
            })
            .map_err(|_| WireError::Closed)
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.workers.is_empty() {
            return Ok(());
        }

        tracing::debug!("Closing connection to {}", self.peer_addr);
        let _ = self.events.send(Event::Shutdown);
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotConnected => {}
            Err(e) => return Err(e.into()),
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("Session worker for {} panicked", self.peer_addr);
            }
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("Error closing connection to {}: {}", self.peer_addr, e);
        }
    }
}

/// Resolve the configured address and connect to the first that answers
fn open_stream(config: &Config) -> Result<TcpStream> {
    let mut last_error = None;
    for addr in (config.host.as_str(), config.port).to_socket_addrs()? {
        let attempt = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(match last_error {
        Some(e) => e.into(),
        None => WireError::Config(format!("{} did not resolve to any address", config.addr())),
    })
}

/// Forward socket reads to the actor until EOF
fn read_loop(mut stream: TcpStream, buffer_size: usize, events: Sender<Event>) {
    let mut buf = vec![0u8; buffer_size];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("Server closed the connection");
                break;
            }
            Ok(n) => {
                tracing::trace!("Read {} bytes from socket", n);
                if events.send(Event::Data(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("Socket read failed: {}", e);
                break;
            }
        }
    }
    let _ = events.send(Event::Closed);
}

/// Own the engine state and apply events one at a time
fn run_actor(mut core: SessionCore, events: Receiver<Event>, status: Arc<RwLock<SessionStatus>>) {
    if let Err(e) = core.start() {
        core.report(&e);
    }
    *status.write() = core.status();

    for event in events.iter() {
        let outcome = match event {
            Event::Data(chunk) => core.on_data(chunk),
            Event::Closed => {
                core.on_close();
                Ok(())
            }
            Event::Execute {
                command,
                completion,
            } => core.execute(command, completion),
            Event::Subscribe(subscriber) => {
                core.add_subscriber(subscriber);
                Ok(())
            }
            Event::Shutdown => {
                core.on_close();
                *status.write() = core.status();
                break;
            }
        };

        match outcome {
            Ok(()) => {}
            Err(WireError::Closed) => tracing::debug!("Dropped event for closed session"),
            Err(e) => core.report(&e),
        }
        *status.write() = core.status();
    }

    tracing::debug!("Session actor stopped");
}
