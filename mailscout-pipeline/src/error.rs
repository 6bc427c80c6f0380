//! Halting pipeline errors.
//!
//! Only errors that stop the run live here. Per-address probe failures and
//! per-recipient dispatch failures are data, aggregated into the outcome
//! and failed lists instead.

use thiserror::Error;

use crate::event::Stage;

/// An error that halts the pipeline at a stage. Surfaces to the consumer
/// as the single terminal error event, carrying only the stage and a
/// human-readable message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input was missing or malformed.
    #[error("{message}")]
    Input { stage: Stage, message: String },

    /// An upstream stage produced zero usable items.
    #[error("{message}")]
    Empty { stage: Stage, message: String },
}

impl PipelineError {
    #[must_use]
    pub fn input(stage: Stage, message: impl Into<String>) -> Self {
        Self::Input {
            stage,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn empty(stage: Stage, message: impl Into<String>) -> Self {
        Self::Empty {
            stage,
            message: message.into(),
        }
    }

    /// The stage the run halted at.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Input { stage, .. } | Self::Empty { stage, .. } => *stage,
        }
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Input { message, .. } | Self::Empty { message, .. } => message,
        }
    }
}
