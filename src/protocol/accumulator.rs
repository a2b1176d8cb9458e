//! String accumulator
//!
//! Collects the unescaped bytes of one string frame while it arrives in
//! pieces. The buffer is kept between strings so steady-state decoding does
//! not allocate for the backing storage.

/// Default starting capacity (bytes)
pub const DEFAULT_CAPACITY: usize = 1024;

/// Growable byte buffer with an explicit write offset
#[derive(Debug)]
pub struct StringAccumulator {
    /// Backing storage; its length is the current capacity
    buf: Vec<u8>,

    /// Number of bytes written for the string in progress
    offset: usize,
}

impl StringAccumulator {
    /// Create an accumulator with the given starting capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            offset: 0,
        }
    }

    /// Append one byte, doubling the capacity if it is full
    pub fn push(&mut self, byte: u8) {
        if self.offset == self.buf.len() {
            self.grow();
        }
        self.buf[self.offset] = byte;
        self.offset += 1;
    }

    /// Hand out the completed string and rewind for the next one
    pub fn take(&mut self) -> Vec<u8> {
        let bytes = self.buf[..self.offset].to_vec();
        self.offset = 0;
        bytes
    }

    /// Bytes written so far for the string in progress
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.offset]
    }

    pub fn len(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn grow(&mut self) {
        let doubled = self.buf.len() * 2;
        tracing::trace!("Growing string accumulator: {} -> {} bytes", self.buf.len(), doubled);
        self.buf.resize(doubled, 0);
    }
}

impl Default for StringAccumulator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
