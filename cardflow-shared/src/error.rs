/// Error taxonomy for board mutations
///
/// Every store and service operation returns `Result<T, ServiceError>`.
/// The variants map one-to-one onto the failure kinds the transport
/// layer exposes:
///
/// - `NotFound` / `Forbidden` — client errors, never retried
/// - `Conflict` — safe for the caller to retry
/// - `InvariantViolation` — a defensive ordering check failed after a
///   write; the transaction is aborted and the error surfaces as a
///   server error, never swallowed
/// - `Database` — any other storage failure

use thiserror::Error;

/// Unified error type for the board mutation core.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The target board, list, task, user, or membership is absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Role policy denied the operation
    #[error("operation not permitted")]
    Forbidden,

    /// Concurrent contention exceeded the retry budget, or a uniqueness
    /// rule was violated (e.g. re-adding an existing member)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A post-write density check found duplicate or gapped positions.
    /// Indicates a bug; the enclosing transaction must be rolled back.
    #[error("ordering invariant violated: {0}")]
    InvariantViolation(String),

    /// Underlying storage failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// True for failures the caller may safely retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }
}

/// Result alias used throughout the store and service layers.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ServiceError::NotFound("board").to_string(), "board not found");
        assert_eq!(
            ServiceError::Forbidden.to_string(),
            "operation not permitted"
        );
        assert!(ServiceError::Conflict("move contention".into())
            .to_string()
            .contains("move contention"));
    }

    #[test]
    fn test_retryable() {
        assert!(ServiceError::Conflict("x".into()).is_retryable());
        assert!(!ServiceError::Forbidden.is_retryable());
        assert!(!ServiceError::NotFound("task").is_retryable());
        assert!(!ServiceError::InvariantViolation("dup".into()).is_retryable());
    }
}
