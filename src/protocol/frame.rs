//! Frame definitions
//!
//! The two units the decoder can hand out.

use crate::error::{Result, WireError};

/// What the engine is waiting to receive next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    /// A terminated, escaped string
    String,

    /// One raw byte
    Byte,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Unescaped string bytes, terminator removed
    Text(Vec<u8>),

    /// A raw status byte
    Byte(u8),
}

impl Frame {
    pub fn kind(&self) -> ReadKind {
        match self {
            Frame::Text(_) => ReadKind::String,
            Frame::Byte(_) => ReadKind::Byte,
        }
    }

    /// Interpret as UTF-8 text; invalid sequences are replaced, not rejected
    pub fn into_text(self) -> Result<String> {
        match self {
            Frame::Text(bytes) => Ok(lossy_text(bytes)),
            Frame::Byte(b) => Err(WireError::Protocol(format!(
                "expected a string frame, got byte 0x{:02x}",
                b
            ))),
        }
    }

    pub fn into_byte(self) -> Result<u8> {
        match self {
            Frame::Byte(b) => Ok(b),
            Frame::Text(bytes) => Err(WireError::Protocol(format!(
                "expected a status byte, got a {}-byte string",
                bytes.len()
            ))),
        }
    }
}

/// UTF-8 text with invalid sequences replaced by U+FFFD
pub(crate) fn lossy_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
