use derive_more::Display;
use std::sync::Arc;

/// Current sign-in state of the account.
///
/// Anonymous sessions never show up here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
pub enum LoginStatus {
    /// Not yet decided; only seen before the manager has asked the provider.
    #[default]
    #[display("not set")]
    NotSet,
    #[display("signed out")]
    SignedOut,
    #[display("signing in")]
    SigningIn,
    /// Signed in with a full (non-anonymous) account. The email may be empty
    /// if the provider doesn't share it.
    #[display("signed in as {_0}")]
    SignedIn(String),
    #[display("sign-in failed")]
    SignInError,
}
impl LoginStatus {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

/// Observer of [`LoginStatus`] assignments.
pub trait LoginListener: Send + Sync {
    /// Called on every assignment, even when the status did not change.
    fn on_login_status_changed(&self, status: &LoginStatus);
}

/// Shared handle to a registered [`LoginListener`].
pub type LoginListenerHandle = Arc<dyn LoginListener>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LoginStatus::NotSet, "not set")]
    #[case(LoginStatus::SignedOut, "signed out")]
    #[case(LoginStatus::SigningIn, "signing in")]
    #[case(LoginStatus::SignedIn("ada@example.com".to_string()), "signed in as ada@example.com")]
    #[case(LoginStatus::SignInError, "sign-in failed")]
    fn test_display(#[case] status: LoginStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }

    #[test]
    fn test_only_signed_in_counts_as_signed_in() {
        assert!(LoginStatus::SignedIn(String::new()).is_signed_in());
        assert!(!LoginStatus::SigningIn.is_signed_in());
        assert!(!LoginStatus::default().is_signed_in());
    }
}
