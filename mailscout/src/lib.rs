//! Binary-side wiring: configuration, the file-backed employee roster,
//! and the outbound SMTP dispatcher.

pub mod config;
pub mod dispatch;
pub mod roster;

pub use config::Config;
pub use dispatch::SmtpDispatcher;
pub use roster::FileRoster;
