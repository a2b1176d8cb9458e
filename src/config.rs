//! Configuration for xqwire
//!
//! Centralized connection settings with sensible defaults.

use std::fmt;
use std::time::Duration;

use crate::error::{Result, WireError};

/// Main configuration for a client session
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Address
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// Login user name
    pub username: String,

    /// Login password (only its digest ever leaves the process)
    pub password: String,

    // -------------------------------------------------------------------------
    // Buffering
    // -------------------------------------------------------------------------
    /// Size of each socket read (bytes)
    pub read_buffer_size: usize,

    /// Starting capacity of the string accumulator (bytes, doubles on demand)
    pub initial_string_capacity: usize,

    // -------------------------------------------------------------------------
    // Socket Tuning
    // -------------------------------------------------------------------------
    /// Disable Nagle's algorithm
    pub nodelay: bool,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// How long `Session::query` waits for a reply (None = forever)
    pub query_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1984,
            username: "admin".to_string(),
            password: "admin".to_string(),
            read_buffer_size: 8 * 1024,
            initial_string_capacity: 1024,
            nodelay: true,
            connect_timeout_ms: 5000,
            query_timeout_ms: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("read_buffer_size", &self.read_buffer_size)
            .field("initial_string_capacity", &self.initial_string_capacity)
            .field("nodelay", &self.nodelay)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` form of the server address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(WireError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(WireError::Config("port must not be 0".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(WireError::Config(
                "read_buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.initial_string_capacity == 0 {
            return Err(WireError::Config(
                "initial_string_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the login user name
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the login password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the socket read size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the initial string accumulator capacity (in bytes)
    pub fn initial_string_capacity(mut self, size: usize) -> Self {
        self.config.initial_string_capacity = size;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set how long `Session::query` waits for a reply (in milliseconds)
    pub fn query_timeout_ms(mut self, ms: u64) -> Self {
        self.config.query_timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
