//! The terminal aggregate of one pipeline run.

use serde::{Deserialize, Serialize};

/// One recipient the dispatcher could not deliver to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDispatch {
    pub address: String,
    pub reason: String,
}

/// Built exactly once, at pipeline end, whether the run completed or
/// halted early. Immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// `true` when the run reached the end of dispatch, even if
    /// individual sends failed.
    pub succeeded: bool,
    /// Human-readable summary of the run.
    pub summary: String,
    /// Recipients the dispatcher delivered to.
    pub sent: Vec<String>,
    /// Recipients the dispatcher could not deliver to, with reasons.
    pub failed: Vec<FailedDispatch>,
    /// Addresses that passed verification.
    pub verified: Vec<String>,
}

impl RunResult {
    /// A halted run: nothing sent, nothing failed, verified list as far
    /// as the run got.
    #[must_use]
    pub fn halted(summary: impl Into<String>, verified: Vec<String>) -> Self {
        Self {
            succeeded: false,
            summary: summary.into(),
            sent: Vec::new(),
            failed: Vec::new(),
            verified,
        }
    }
}
