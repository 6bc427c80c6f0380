//! External collaborator contracts.
//!
//! The orchestrator depends on its collaborators only through these
//! object-safe traits, held as `Arc<dyn …>` so a binary can wire in real
//! implementations and tests can wire in stubs.

use async_trait::async_trait;
use thiserror::Error;

use mailscout_common::Employee;
use mailscout_verify::{VerificationOutcome, VerificationPool};

/// A single failed delivery attempt. The orchestrator records the reason
/// and moves on; it never retries.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct DispatchError {
    pub reason: String,
}

impl DispatchError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Finds likely employees of a company, optionally filtered by role.
///
/// An empty result is the contract's failure signal; `Err` is reserved
/// for the source itself being unreachable.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn discover(&self, company: &str, role: Option<&str>) -> anyhow::Result<Vec<Employee>>;
}

/// Classifies candidate addresses for deliverability.
#[async_trait]
pub trait AddressVerifier: Send + Sync {
    /// One outcome per input address, in input order.
    async fn verify_all(&self, addresses: &[String]) -> Vec<VerificationOutcome>;
}

#[async_trait]
impl AddressVerifier for VerificationPool {
    async fn verify_all(&self, addresses: &[String]) -> Vec<VerificationOutcome> {
        Self::verify_all(self, addresses).await
    }
}

/// Delivers one message to one recipient. One attempt, no internal retry.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DispatchError>;
}
