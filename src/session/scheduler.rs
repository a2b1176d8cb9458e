//! Command scheduling
//!
//! One command at a time. A command issued while the connection is busy is
//! wrapped in a thunk that repeats the same `execute` call and parked in a
//! FIFO queue. Each successful completion frees the connection and runs
//! exactly one parked thunk; that thunk's own completion runs the next.
//!
//! A failed command leaves the connection busy and the queue untouched.
//! Commands behind it stay parked until the connection closes.

use crossbeam::channel::Sender;

use crate::error::{Result, WireError};
use crate::protocol::{encode_string, Reply, Status};

use super::chain;
use super::notify::{Notification, Notifier};
use super::state::{Phase, SessionCore};

/// Success callback: `(result, info)`
pub type Handler = Box<dyn FnOnce(String, String) + Send>;

/// A parked `execute` call
pub(crate) type Deferred = Box<dyn FnOnce(&mut SessionCore) -> Result<()> + Send>;

/// Where the outcome of a command goes
pub enum Completion {
    /// Caller callback, run only on success
    Handler(Handler),

    /// Blocking caller waiting on a channel
    Reply(Sender<Result<Reply>>),

    /// Nobody asked: publish a `Result` notification
    Default,
}

impl Completion {
    fn deliver(self, reply: Reply, notifier: &mut Notifier) {
        match self {
            Completion::Handler(handler) => handler(reply.result, reply.info),
            Completion::Reply(tx) => {
                let _ = tx.send(Ok(reply));
            }
            Completion::Default => notifier.emit(Notification::Result {
                result: reply.result,
                info: reply.info,
                code: Status::Ok.code(),
            }),
        }
    }

    fn fail(self, error: WireError) {
        if let Completion::Reply(tx) = self {
            let _ = tx.send(Err(error));
        }
    }
}

impl From<Option<Handler>> for Completion {
    fn from(handler: Option<Handler>) -> Self {
        handler.map_or(Completion::Default, Completion::Handler)
    }
}

impl From<Handler> for Completion {
    fn from(handler: Handler) -> Self {
        Completion::Handler(handler)
    }
}

impl SessionCore {
    /// Run `command`, or queue it behind the one in flight
    pub fn execute(&mut self, command: impl Into<String>, completion: impl Into<Completion>) -> Result<()> {
        let command = command.into();
        let completion = completion.into();

        if self.phase == Phase::Closed {
            completion.fail(WireError::Closed);
            return Err(WireError::Closed);
        }

        if self.busy {
            self.queue.push_back(Box::new(move |core: &mut SessionCore| {
                core.execute(command, completion)
            }));
            tracing::debug!("Connection busy, command queued ({} waiting)", self.queue.len());
            return Ok(());
        }

        self.busy = true;
        tracing::debug!("Sending command: {}", command);
        self.send(&encode_string(command.as_bytes()))?;

        chain::run(
            self,
            move |core: &mut SessionCore, (result, info, code): (String, String, u8)| {
                core.finish_command(command, completion, Reply { result, info }, code)
            },
        )
    }

    fn finish_command(
        &mut self,
        command: String,
        completion: Completion,
        reply: Reply,
        code: u8,
    ) -> Result<()> {
        match Status::from_byte(code) {
            Status::Ok => {
                tracing::debug!("Command succeeded: {}", command);
                completion.deliver(reply, &mut self.notifier);
                self.busy = false;
                self.drain()
            }
            Status::Failed(code) => {
                tracing::debug!("Command failed with status {}: {}", code, command);
                let error = WireError::CommandFailed {
                    command,
                    info: reply.info,
                };
                self.report(&error);
                completion.fail(error);
                Ok(())
            }
        }
    }

    /// Run the next parked command, if the connection is free
    pub(super) fn drain(&mut self) -> Result<()> {
        if self.busy {
            return Ok(());
        }
        match self.queue.pop_front() {
            Some(deferred) => {
                tracing::debug!("Draining queued command ({} left)", self.queue.len());
                deferred(self)
            }
            None => Ok(()),
        }
    }
}
