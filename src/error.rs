//! Error types for the console server.
//!
//! Only failures that change control flow are modelled here. Malformed escape
//! sequences are logged and skipped, and unknown commands or bad argument
//! counts are reported to the peer as plain text, so neither shows up below.

use std::io;

/// Errors raised by the console core.
#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    /// Read or write failure on the peer stream. Fatal to the session.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The peer kept typing without ever finishing the line.
    #[error("input line exceeds {0} bytes")]
    LineTooLong(usize),

    /// A command was registered with `min_params > max_params`.
    #[error("params of command {name} are invalid: min {min} > max {max}")]
    InvalidParams {
        name: String,
        min: usize,
        max: usize,
    },
}

impl ConsoleError {
    /// True when the peer simply went away (EOF or reset).
    pub fn is_disconnect(&self) -> bool {
        match self {
            ConsoleError::Connection(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
