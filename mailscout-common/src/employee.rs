//! Employee records as supplied by a discovery collaborator.

use serde::{Deserialize, Serialize};

/// A discovered employee. Carries nothing beyond the scraped display name;
/// identity resolution is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Display name as scraped, e.g. `"Jane Doe"`.
    pub name: String,
}

impl Employee {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
