//! Error types for xqwire
//!
//! Provides a unified error type for all session operations.

use thiserror::Error;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// Unified error type for xqwire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed for user '{username}' (status {code})")]
    AuthenticationFailed { username: String, code: u8 },

    #[error("Command failed: {command}: {info}")]
    CommandFailed { command: String, info: String },

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Connection closed")]
    Closed,

    #[error("Timed out: {0}")]
    Timeout(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
