//! Minimal outbound SMTP client.
//!
//! Speaks plaintext SMTP over TCP: reply parsing (including multi-line
//! replies), command writing, and the handful of commands the verifier and
//! dispatcher need. There is deliberately no TLS surface — both callers talk
//! to port 25 and abort or finish before any content worth protecting is on
//! the wire.

mod client;
mod error;
mod reply;

pub use client::SmtpClient;
pub use error::{ClientError, Result};
pub use reply::Reply;
