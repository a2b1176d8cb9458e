//! Frame decoder
//!
//! Turns an unbounded sequence of socket chunks into frames.
//!
//! Chunks are queued untouched in arrival order. A string frame may span any
//! number of chunks, and a chunk boundary may fall between an escape byte and
//! the byte it protects, or inside a multi-byte UTF-8 sequence: bytes are
//! unescaped into the [`StringAccumulator`] as they are seen and only turned
//! into text once the terminator shows up.
//!
//! The decoder cannot tell a correctly escaped stream from a broken one. An
//! unescaped 0x00 inside a string simply ends it early.

use std::collections::VecDeque;

use bytes::{Buf, Bytes};

use super::frame::lossy_text;
use super::{Frame, ReadKind, StringAccumulator, ESCAPE, TERMINATOR};

/// Incremental decoder over a FIFO chain of raw chunks
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Received but not yet consumed chunks, oldest first
    chain: VecDeque<Bytes>,

    /// Bytes of the string in progress
    accumulator: StringAccumulator,

    /// Last byte seen was an unconsumed escape
    in_escape: bool,
}

impl FrameDecoder {
    /// Create a decoder whose accumulator starts at `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chain: VecDeque::new(),
            accumulator: StringAccumulator::with_capacity(capacity),
            in_escape: false,
        }
    }

    /// Queue a chunk received from the transport
    pub fn push(&mut self, chunk: Bytes) {
        if !chunk.is_empty() {
            self.chain.push_back(chunk);
        }
    }

    /// Try to produce a frame of the requested kind
    pub fn try_read(&mut self, kind: ReadKind) -> Option<Frame> {
        match kind {
            ReadKind::String => self.decode_next_bytes().map(Frame::Text),
            ReadKind::Byte => self.read_byte().map(Frame::Byte),
        }
    }

    /// Take the next raw byte, if any has arrived
    pub fn read_byte(&mut self) -> Option<u8> {
        let front = self.chain.front_mut()?;
        let byte = front.get_u8();
        if front.is_empty() {
            self.chain.pop_front();
        }
        Some(byte)
    }

    /// Decode the next string frame as text
    ///
    /// Returns `None` when no terminator has arrived yet; everything seen so
    /// far is kept for the next attempt.
    pub fn decode_next_string(&mut self) -> Option<String> {
        self.decode_next_bytes().map(lossy_text)
    }

    /// Decode the next string frame as raw unescaped bytes
    pub fn decode_next_bytes(&mut self) -> Option<Vec<u8>> {
        while let Some(chunk) = self.chain.pop_front() {
            for (i, &byte) in chunk.iter().enumerate() {
                if self.in_escape {
                    self.accumulator.push(byte);
                    self.in_escape = false;
                } else if byte == ESCAPE {
                    self.in_escape = true;
                } else if byte == TERMINATOR {
                    let rest = chunk.slice(i + 1..);
                    if !rest.is_empty() {
                        self.chain.push_front(rest);
                    }
                    return Some(self.accumulator.take());
                } else {
                    self.accumulator.push(byte);
                }
            }
        }
        None
    }

    /// Bytes queued and not yet looked at
    pub fn buffered(&self) -> usize {
        self.chain.iter().map(Bytes::len).sum()
    }

    /// Bytes of a partially received string
    pub fn partial_len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn in_escape(&self) -> bool {
        self.in_escape
    }
}
