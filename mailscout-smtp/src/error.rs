//! Error types for the SMTP client.

use std::io;

use thiserror::Error;

/// Errors that can occur while talking to a mail server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// IO error during network operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The server sent something that does not parse as an SMTP reply.
    #[error("failed to parse SMTP reply: {0}")]
    Parse(String),

    /// The connection was closed before a complete reply arrived.
    #[error("connection closed unexpectedly")]
    ConnectionClosed,

    /// The server sent bytes that are not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Specialized `Result` for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
