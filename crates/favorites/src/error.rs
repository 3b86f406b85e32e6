//! Favorites Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A favorites error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for favorites operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a favorites failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read or write via the [record store](photos_store::Repository) failed.
    #[display("favorites store error")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
