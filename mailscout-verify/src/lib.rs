//! Deliverability verification without delivery.
//!
//! Resolves a candidate address's mail exchanger, opens a plaintext SMTP
//! session, and walks the dialogue up to `RCPT TO` — then quits before
//! `DATA`, so no mail ever reaches the target mailbox. The pool fans the
//! probe out over a candidate set with bounded concurrency.

mod dns;
mod outcome;
mod pool;
mod probe;

pub use dns::{DnsConfig, DnsError, MailExchanger, MxResolver};
pub use outcome::{VerificationOutcome, Verdict};
pub use pool::{DEFAULT_MAX_CONCURRENT, VerificationPool};
pub use probe::{Verifier, VerifierConfig};
