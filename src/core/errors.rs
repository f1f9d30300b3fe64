/*!
 * Lock Error Types
 * Defines error types for lock operations
 */

use thiserror::Error;

/// Lock operation errors with canonical caller-visible messages
///
/// The `Display` output is exactly what a caller observes on a rejected
/// future. Underlying OS detail (errno) is logged at the failure site rather
/// than carried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LockError {
    /// Caller passed the wrong argument shape; reported synchronously,
    /// before any background work is scheduled
    #[error("{0}")]
    InvalidArgument(String),

    /// Target path could not be opened
    #[error("Failed to open file")]
    OpenFailed,

    /// OS denied exclusive acquisition
    #[error("Failed to lock file")]
    LockFailed,

    /// OS denied release
    #[error("Failed to unlock file")]
    UnlockFailed,

    /// Worker pool refused or lost the request
    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

impl LockError {
    /// Create an invalid argument error
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a dispatch error
    #[inline]
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_messages() {
        assert_eq!(LockError::OpenFailed.to_string(), "Failed to open file");
        assert_eq!(LockError::LockFailed.to_string(), "Failed to lock file");
        assert_eq!(LockError::UnlockFailed.to_string(), "Failed to unlock file");
        assert_eq!(
            LockError::invalid_argument("Invalid string argument").to_string(),
            "Invalid string argument"
        );
    }
}
