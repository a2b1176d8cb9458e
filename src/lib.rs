//! # xqwire
//!
//! Client engine for the document-query server protocol:
//! - NUL-terminated, 0xFF-escaped string frames and raw status bytes
//! - Fragment-safe incremental decoding of an unbounded byte stream
//! - MD5 challenge/response login handshake
//! - Single in-flight command per connection with FIFO queueing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Session (handle)                         │
//! │             execute / query / subscribe / close              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ events
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                SessionCore (actor-owned)                     │
//! │         Authenticator  ·  CommandScheduler  ·  Notifier      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Read Chain  │─────────►│ PendingRead │
//!   │ (str,str,b) │          │  (≤ 1 slot) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌──────────────┐
//!                           │ FrameDecoder │
//!                           │ chunk chain  │
//!                           └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use xqwire::{Config, Session};
//!
//! let config = Config::builder().host("localhost").port(1984).build();
//! let session = Session::connect(config)?;
//! let reply = session.query("xquery 1 + 1")?;
//! println!("{}", reply.result);
//! session.close()?;
//! # Ok::<(), xqwire::WireError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod session;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WireError, Result};
pub use config::Config;
pub use network::Session;
pub use protocol::Reply;
pub use session::{Handler, Notification, SessionCore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of xqwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
