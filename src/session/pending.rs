//! Pending read slot
//!
//! The server never speaks unless asked, so the engine only ever waits for
//! one thing at a time. The slot enforces that.

use std::fmt;

use crate::error::{Result, WireError};
use crate::protocol::{Frame, ReadKind};

/// What runs once the awaited frame is available
pub type Continuation<S> = Box<dyn FnOnce(&mut S, Frame) -> Result<()> + Send>;

/// Something that can hand out frames, now or later
pub trait FrameSource: Sized + 'static {
    /// Deliver the next frame of `kind` to `then`
    ///
    /// Runs `then` immediately when the frame is already buffered, otherwise
    /// parks it until enough data has arrived.
    fn read(&mut self, kind: ReadKind, then: Continuation<Self>) -> Result<()>;
}

/// Holds at most one outstanding read
pub struct PendingRead<S> {
    slot: Option<(ReadKind, Continuation<S>)>,
}

impl<S> PendingRead<S> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Park a read; fails if another one is already waiting
    pub fn register(&mut self, kind: ReadKind, then: Continuation<S>) -> Result<()> {
        if let Some((waiting, _)) = &self.slot {
            return Err(WireError::Protocol(format!(
                "cannot wait for {:?}: a {:?} read is already pending",
                kind, waiting
            )));
        }
        self.slot = Some((kind, then));
        Ok(())
    }

    /// Kind of the parked read, if any
    pub fn kind(&self) -> Option<ReadKind> {
        self.slot.as_ref().map(|(kind, _)| *kind)
    }

    /// Remove the parked continuation so it can be resumed
    pub fn take(&mut self) -> Option<Continuation<S>> {
        self.slot.take().map(|(_, then)| then)
    }

    /// Drop the parked read without running it
    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

impl<S> Default for PendingRead<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for PendingRead<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRead")
            .field("kind", &self.kind())
            .finish()
    }
}
