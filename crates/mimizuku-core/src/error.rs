//! Error taxonomy shared by every Mimizuku crate.
//!
//! Logical answers (consistent / inconsistent, satisfiable / unsatisfiable)
//! are never errors. Only interruption and genuine failures travel here.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasonerError {
    /// The elapsed-time budget ran out before a verdict was reached.
    #[error("Reasoning timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The caller raised the cancellation flag.
    #[error("Reasoning was cancelled")]
    Cancelled,

    /// A bug: some internal invariant did not hold.
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Unknown individual: {0}")]
    UnknownIndividual(String),

    #[error("Non-regular role hierarchy: {0}")]
    NonRegularRoleHierarchy(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("Completion graph exceeded the limit of {0} nodes")]
    NodeLimitExceeded(usize),
}

impl ReasonerError {
    /// Timeout or cancellation: the caller may retry and resume.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, ReasonerError::Timeout { .. } | ReasonerError::Cancelled)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ReasonerError::InternalInvariant(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ReasonerError>;
