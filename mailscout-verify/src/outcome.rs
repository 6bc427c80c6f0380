//! Verification verdicts.

use serde::{Deserialize, Serialize};

/// Classification of a single address probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The exchanger accepted `RCPT TO` for the address.
    Valid,
    /// The address failed RFC 5321 syntax validation; no network traffic.
    InvalidFormat,
    /// The domain publishes no MX records or does not exist.
    NoMailExchanger,
    /// The exchanger answered the dialogue with a non-250 code.
    RejectedByServer,
    /// The shared probe deadline expired before a verdict.
    Timeout,
    /// Connection, DNS transport, or protocol failure.
    TransportError,
}

impl Verdict {
    /// `true` only for [`Verdict::Valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// The result of probing one candidate address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// The candidate address that was probed.
    pub address: String,
    /// Probe classification.
    pub verdict: Verdict,
    /// Raw server line or error description, when one exists.
    pub detail: Option<String>,
}

impl VerificationOutcome {
    #[must_use]
    pub fn new(address: impl Into<String>, verdict: Verdict, detail: Option<String>) -> Self {
        Self {
            address: address.into(),
            verdict,
            detail,
        }
    }

    /// Outcome with no detail.
    #[must_use]
    pub fn bare(address: impl Into<String>, verdict: Verdict) -> Self {
        Self::new(address, verdict, None)
    }
}
