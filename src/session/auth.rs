//! Login handshake
//!
//! ```text
//! server ── nonce\0 ──────────────► client
//! client ── user\0 digest\0 ──────► server
//! server ── status (1 byte) ──────► client      0 = logged in
//! ```
//!
//! `digest = md5_hex(md5_hex(password) + nonce)`. The handshake runs once per
//! connection and is never retried.

use std::fmt;

use crate::error::{Result, WireError};
use crate::protocol::{encode_strings, Frame, Status};

use super::notify::Notification;
use super::state::{Phase, SessionCore};

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Digest answering the server's `nonce`
    pub fn digest(&self, nonce: &str) -> String {
        login_digest(&self.password, nonce)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `md5_hex(md5_hex(password) + nonce)`
pub fn login_digest(password: &str, nonce: &str) -> String {
    md5_hex(&format!("{}{}", md5_hex(password), nonce))
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Wait for the nonce
pub(super) fn begin(core: &mut SessionCore) -> Result<()> {
    tracing::debug!("Waiting for login nonce");
    core.phase = Phase::AwaitingNonce;
    core.read_string(Box::new(on_nonce))
}

fn on_nonce(core: &mut SessionCore, frame: Frame) -> Result<()> {
    let nonce = frame.into_text()?;
    tracing::debug!(
        "Received nonce, logging in as '{}'",
        core.credentials.username()
    );

    let digest = core.credentials.digest(&nonce);
    let message = encode_strings([core.credentials.username().as_bytes(), digest.as_bytes()]);
    core.send(&message)?;

    core.phase = Phase::AwaitingStatus;
    core.read_byte(Box::new(on_status))
}

fn on_status(core: &mut SessionCore, frame: Frame) -> Result<()> {
    match Status::from_byte(frame.into_byte()?) {
        Status::Ok => {
            tracing::info!("Logged in as '{}'", core.credentials.username());
            core.phase = Phase::Ready;
            core.busy = false;
            core.notifier.emit(Notification::LoggedIn);
            core.drain()
        }
        Status::Failed(code) => {
            core.phase = Phase::AuthFailed;
            let error = WireError::AuthenticationFailed {
                username: core.credentials.username().to_string(),
                code,
            };
            core.report(&error);
            Ok(())
        }
    }
}
