//! Config Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A layer could not be read or the merged result did not fit [`Config`](crate::Config).
    #[display("could not load configuration")]
    Load,
    /// The configuration loaded but holds a value that can't be used.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Load.to_string(), "could not load configuration");
        assert_eq!(ErrorKind::Invalid("database path is empty").to_string(), "invalid configuration: database path is empty");
    }
}
