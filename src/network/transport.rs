//! Transports
//!
//! The write half of a connection. Incoming data does not go through this
//! trait: whoever owns the socket feeds it to `SessionCore::on_data`.

use std::io::{BufWriter, Write};
use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Sink for encoded frames
pub trait Transport: Send {
    /// Write `bytes` completely and push them onto the wire
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

/// TCP write half
pub struct TcpTransport {
    /// Buffered so a multi-frame message leaves in one segment
    writer: BufWriter<TcpStream>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            writer: BufWriter::new(stream),
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory transport that records everything sent
///
/// Clones share the same record, so a test can keep one handle while the
/// session owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<u8>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().clone()
    }

    /// Everything sent since the last call
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sent.lock().extend_from_slice(bytes);
        Ok(())
    }
}
