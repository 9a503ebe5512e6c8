use std::time::Duration;

use thiserror::Error;

/// Errors from object backend operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No object exists at the requested key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or rejected the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within the allotted time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl BackendError {
    /// Returns `true` for failures worth retrying (everything except `NotFound`).
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_not_transient() {
        assert!(!BackendError::NotFound("k".into()).is_transient());
        assert!(BackendError::Unavailable("reset".into()).is_transient());
        assert!(BackendError::Timeout(Duration::from_secs(1)).is_transient());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            BackendError::NotFound("blobs/alice/x".into()).to_string(),
            "object not found: blobs/alice/x"
        );
        assert_eq!(
            BackendError::Timeout(Duration::from_secs(5)).to_string(),
            "operation timed out after 5s"
        );
    }
}
