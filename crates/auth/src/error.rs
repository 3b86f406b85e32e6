//! Auth Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An auth error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The identity provider rejected the credential.
    #[display("credential rejected by identity provider")]
    Credential,
    /// The identity provider could not be reached.
    #[display("identity provider unreachable")]
    Network,
    /// Provider-specific failure.
    #[display("identity provider error: {_0}")]
    Provider(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Credential.to_string(), "credential rejected by identity provider");
        assert_eq!(ErrorKind::Provider("quota exceeded".to_string()).to_string(), "identity provider error: quota exceeded");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(!ErrorKind::Credential.is_retryable());
    }
}
