//! Network Module
//!
//! TCP connection handling.
//!
//! ## Architecture
//! - Reader thread: blocking socket reads, forwarded as events
//! - Actor thread: sole owner of the `SessionCore`, handles events in order
//! - `Session` handle: submits commands and subscriptions as events

mod connection;
mod transport;

pub use connection::Session;
pub use transport::{RecordingTransport, TcpTransport, Transport};
