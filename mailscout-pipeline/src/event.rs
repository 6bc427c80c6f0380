//! Stage events — the pipeline's primary output contract.
//!
//! Events are emitted in strict temporal order as the run crosses stage
//! boundaries and sub-steps. Exactly one terminal [`EventKind::Complete`]
//! or [`EventKind::Error`] event ends the stream. Everything here is
//! serde-serializable so an outer layer can forward the stream as JSON.

use serde::{Deserialize, Serialize};

use crate::result::RunResult;

/// The ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Discovery,
    DomainResolution,
    Generation,
    Verification,
    Dispatch,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Discovery => "discovery",
            Self::DomainResolution => "domain resolution",
            Self::Generation => "generation",
            Self::Verification => "verification",
            Self::Dispatch => "dispatch",
        })
    }
}

/// Classification of a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Non-terminal narration of stage progress.
    Progress,
    /// Terminal: the run finished. Individual send failures do not
    /// prevent completion.
    Complete,
    /// Terminal: the run halted at the event's stage.
    Error,
}

/// Stage-specific event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    None,
    EmployeesFound { count: usize },
    DomainResolved { domain: String },
    CandidatesGenerated { count: usize },
    Verified { addresses: Vec<String> },
    DispatchAttempt { address: String },
    DispatchOutcome { address: String, error: Option<String> },
    Result(RunResult),
}

/// One progress notification from a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    pub kind: EventKind,
    pub stage: Stage,
    pub message: String,
    pub payload: EventPayload,
}

impl StageEvent {
    #[must_use]
    pub fn progress(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Progress,
            stage,
            message: message.into(),
            payload: EventPayload::None,
        }
    }

    #[must_use]
    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            stage,
            message: message.into(),
            payload: EventPayload::None,
        }
    }

    #[must_use]
    pub fn complete(stage: Stage, message: impl Into<String>, result: RunResult) -> Self {
        Self {
            kind: EventKind::Complete,
            stage,
            message: message.into(),
            payload: EventPayload::Result(result),
        }
    }

    /// Attaches a payload to the event.
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// `true` for [`EventKind::Complete`] and [`EventKind::Error`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Complete | EventKind::Error)
    }
}
