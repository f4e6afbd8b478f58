//! Error types raised by the core.

use crate::validation::Violations;
use thiserror::Error;

/// Why an event transition was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The candidate event is malformed. Recoverable by correcting input.
    #[error("Event validation failed with {} violation(s)", .0.len())]
    Validation(Violations),

    /// The actor may not perform the operation. Carries no detail.
    #[error("Operation not permitted")]
    Forbidden,

    /// The transition exists but has no behavior yet.
    #[error("Transition not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<Violations> for EventError {
    fn from(violations: Violations) -> Self {
        Self::Validation(violations)
    }
}
