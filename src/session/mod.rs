//! Session Module
//!
//! The protocol engine: everything that happens between "bytes arrived" and
//! "a caller learns the outcome".
//!
//! ## Responsibilities
//! - Hold the single pending read and resume it when data arrives
//! - Compose multi-frame replies from sequential reads
//! - Run the login handshake once per connection
//! - Keep at most one command in flight and queue the rest
//! - Publish outcomes nobody asked for through notifications
//!
//! ## Ownership
//! All state lives in one [`SessionCore`] value and is only ever touched
//! through `&mut SessionCore`. The network layer gives it to a single actor
//! thread; tests drive it directly.

mod auth;
mod state;
mod notify;
mod pending;
mod scheduler;

pub mod chain;

pub use self::auth::{login_digest, Credentials};
pub use self::state::{Phase, SessionCore, SessionStatus};
pub use self::notify::{Notification, Notifier};
pub use self::pending::{Continuation, FrameSource, PendingRead};
pub use self::scheduler::{Completion, Handler};
