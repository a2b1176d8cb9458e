//! Response definitions
//!
//! Represents what the server sends back for a command.

/// Status byte that closes every login and command exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed(u8),
}

impl Status {
    pub fn from_byte(code: u8) -> Self {
        match code {
            0x00 => Status::Ok,
            other => Status::Failed(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Status::Ok => 0x00,
            Status::Failed(code) => code,
        }
    }
}

/// A successful command reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Command output
    pub result: String,

    /// Diagnostic text (timings, warnings; often empty)
    pub info: String,
}

impl Reply {
    pub fn new(result: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            info: info.into(),
        }
    }
}
