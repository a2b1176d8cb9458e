//! Protocol codec
//!
//! Encoding for outgoing string frames.
//!
//! ## Wire Format
//! ```text
//! "a\0b"  →  61 FF 00 62 00
//! "x"     →  78 00
//! ""      →  00
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::{ESCAPE, TERMINATOR};

/// Encode one string frame: escape 0x00/0xFF and append the terminator
pub fn encode_string(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(data.len() + 1);
    put_string(&mut buf, data);
    buf.freeze()
}

/// Encode several string frames back to back into one buffer
pub fn encode_strings<I, S>(parts: I) -> Bytes
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut buf = BytesMut::new();
    for part in parts {
        put_string(&mut buf, part.as_ref());
    }
    buf.freeze()
}

fn put_string(buf: &mut BytesMut, data: &[u8]) {
    buf.reserve(data.len() + 1);
    for &byte in data {
        if byte == ESCAPE || byte == TERMINATOR {
            buf.put_u8(ESCAPE);
        }
        buf.put_u8(byte);
    }
    buf.put_u8(TERMINATOR);
}
