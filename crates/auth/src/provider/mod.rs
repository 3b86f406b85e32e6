//! Identity provider trait and implementations.
//!
//! The identity provider (a Firebase-style auth service) holds the actual
//! session. The interactive Google sign-in screen lives outside this crate:
//! [`IdentityProvider::launch_sign_in`] starts it and its result is handed
//! back to [`AccountManager::handle_sign_in_result`](crate::AccountManager::handle_sign_in_result).

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockIdentityProvider;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Status code the Google sign-in flow reports when the user backs out.
pub const SIGN_IN_CANCELLED: i32 = 12501;

/// The session the identity provider currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: Option<String>,
    pub anonymous: bool,
}
impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            anonymous: false,
        }
    }

    pub fn anonymous() -> Self {
        Self { email: None, anonymous: true }
    }
}

/// Account returned by a successful interactive Google sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAccount {
    pub id_token: Option<String>,
}

/// Failure reported by the interactive Google sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInFailure {
    pub status_code: i32,
}
impl SignInFailure {
    pub fn is_cancelled(&self) -> bool {
        self.status_code == SIGN_IN_CANCELLED
    }
}

/// Result of the interactive Google sign-in flow.
pub type SignInOutcome = std::result::Result<GoogleAccount, SignInFailure>;

/// Credential exchanged with the identity provider for a full session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Google { id_token: Option<String> },
}

/// Unified interface for identity providers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The session currently held, anonymous or not.
    fn current_user(&self) -> Option<User>;

    /// Start the external interactive sign-in flow. Its outcome arrives
    /// later, through whoever hosts the flow.
    fn launch_sign_in(&self);

    /// Exchange `credential` for a full session.
    async fn sign_in_with_credential(&self, credential: Credential) -> Result<User>;

    /// Create an anonymous session.
    async fn sign_in_anonymously(&self) -> Result<User>;

    /// Drop the current session, if any.
    fn sign_out(&self);
}

pub type ProviderHandle = Arc<dyn IdentityProvider>;
