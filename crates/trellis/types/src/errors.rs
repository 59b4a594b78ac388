//! Error types and failure classification
//!
//! Recovery decisions key off a failure's *kind*, never its concrete
//! type: the retry tier is generic over the caller's error and always
//! surfaces the original value unchanged.

use serde::{Deserialize, Serialize};

/// Classification of a failure for recovery decisions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An operation exceeded its time budget
    Timeout,

    /// A connection to a dependency dropped mid-operation
    ConnectionLost,

    /// A dependency asked us to slow down
    RateLimited,

    /// A dependency is temporarily unreachable or unhealthy
    DependencyUnavailable,

    /// A pool, quota, or buffer ran out
    ResourceExhausted,

    /// The caller supplied malformed input
    InvalidInput,

    /// The caller is not allowed to perform the operation
    Unauthorized,

    /// A referenced entity does not exist
    NotFound,

    /// Stored or transferred data failed integrity checks
    Corrupted,

    /// An unclassified internal failure
    Internal,
}

impl FailureKind {
    /// Kinds that are typically safe to retry: the failure is expected
    /// to clear on its own given a short wait.
    pub fn transient() -> [FailureKind; 5] {
        [
            FailureKind::Timeout,
            FailureKind::ConnectionLost,
            FailureKind::RateLimited,
            FailureKind::DependencyUnavailable,
            FailureKind::ResourceExhausted,
        ]
    }

    pub fn is_transient(&self) -> bool {
        Self::transient().contains(self)
    }
}

/// Failures that can participate in tiered recovery.
///
/// Implemented by [`WorkflowError`] and by any caller-side error type
/// that wants retry support for its own operations.
pub trait Recoverable {
    fn kind(&self) -> FailureKind;
}

/// Errors surfaced by workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid workflow construction: {0}")]
    Validation(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Circuit open, invocation suppressed: {0}")]
    CircuitOpen(String),

    #[error("Tenant storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },
}

impl Recoverable for WorkflowError {
    fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::Validation(_) => FailureKind::InvalidInput,
            WorkflowError::Timeout(_) => FailureKind::Timeout,
            WorkflowError::ConnectionLost(_) => FailureKind::ConnectionLost,
            WorkflowError::RateLimited(_) => FailureKind::RateLimited,
            WorkflowError::DependencyUnavailable(_) => FailureKind::DependencyUnavailable,
            WorkflowError::ResourceExhausted(_) => FailureKind::ResourceExhausted,
            // A breaker rejection must not be retried locally
            WorkflowError::CircuitOpen(_) => FailureKind::Internal,
            WorkflowError::Storage(_) => FailureKind::DependencyUnavailable,
            WorkflowError::Serialization(_) => FailureKind::Corrupted,
            WorkflowError::StepFailed { .. } => FailureKind::Internal,
        }
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(FailureKind::Timeout.is_transient());
        assert!(FailureKind::RateLimited.is_transient());
        assert!(!FailureKind::InvalidInput.is_transient());
        assert!(!FailureKind::Internal.is_transient());
    }

    #[test]
    fn test_workflow_error_classification() {
        let err = WorkflowError::Timeout("feature store".into());
        assert_eq!(err.kind(), FailureKind::Timeout);

        let err = WorkflowError::Validation("bad tenant".into());
        assert_eq!(err.kind(), FailureKind::InvalidInput);

        let err = WorkflowError::CircuitOpen("score_batch".into());
        assert!(!err.kind().is_transient());
    }

    #[test]
    fn test_error_display_names_the_step() {
        let err = WorkflowError::StepFailed {
            step: "load_features".into(),
            reason: "missing partition".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("load_features"));
        assert!(rendered.contains("missing partition"));
    }
}
