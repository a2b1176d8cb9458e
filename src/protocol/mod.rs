//! Protocol Module
//!
//! Defines the wire protocol spoken with the document-query server.
//!
//! ## Frame Format
//!
//! There is no length prefix. A message is a sequence of frames of two kinds:
//!
//! ### Terminated string
//! ```text
//! ┌───────────────────────────────────────┬──────────┐
//! │  UTF-8 bytes (0x00/0xFF as 0xFF, b)   │  0x00    │
//! └───────────────────────────────────────┴──────────┘
//! ```
//!
//! ### Status byte
//! ```text
//! ┌──────────┐
//! │ Code (1) │   0x00 = success, anything else = failure
//! └──────────┘
//! ```
//!
//! ## Exchanges
//! - Login:   server `nonce\0` → client `user\0digest\0` → server status
//! - Command: client `command\0` → server `result\0info\0` → server status

mod accumulator;
mod codec;
mod decoder;
mod frame;
mod response;

pub use accumulator::{StringAccumulator, DEFAULT_CAPACITY};
pub use codec::{encode_string, encode_strings};
pub use decoder::FrameDecoder;
pub use frame::{Frame, ReadKind};
pub use response::{Reply, Status};

/// Marks the next byte as literal data
pub const ESCAPE: u8 = 0xFF;

/// Ends a string frame
pub const TERMINATOR: u8 = 0x00;
