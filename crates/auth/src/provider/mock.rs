//! Scriptable identity provider for testing.

use super::{Credential, IdentityProvider, User};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// In-memory identity provider for testing.
///
/// Starts with no session. Credential and anonymous sign-ins succeed unless
/// told otherwise, and every call is counted so tests can assert on what the
/// account manager asked for. Available to other crates through the `mock`
/// feature.
#[derive(Debug)]
pub struct MockIdentityProvider {
    current: RwLock<Option<User>>,
    credential_email: String,
    reject_credentials: AtomicBool,
    fail_anonymous: AtomicBool,
    launches: AtomicUsize,
    anonymous_requests: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
            credential_email: "mock@example.com".to_string(),
            reject_credentials: AtomicBool::new(false),
            fail_anonymous: AtomicBool::new(false),
            launches: AtomicUsize::new(0),
            anonymous_requests: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
        }
    }
}

impl MockIdentityProvider {
    /// Start with `user` already signed in.
    pub fn with_user(self, user: User) -> Self {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
        self
    }

    /// Email of the account a successful credential sign-in produces.
    pub fn with_credential_email(mut self, email: impl Into<String>) -> Self {
        self.credential_email = email.into();
        self
    }

    /// Reject every credential sign-in.
    pub fn rejecting_credentials(self) -> Self {
        self.reject_credentials.store(true, Ordering::SeqCst);
        self
    }

    /// Fail every anonymous sign-in.
    pub fn failing_anonymous(self) -> Self {
        self.fail_anonymous.store(true, Ordering::SeqCst);
        self
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn anonymous_requests(&self) -> usize {
        self.anonymous_requests.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn set_current(&self, user: Option<User>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn current_user(&self) -> Option<User> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn launch_sign_in(&self) {
        self.launches.fetch_add(1, Ordering::SeqCst);
    }

    async fn sign_in_with_credential(&self, credential: Credential) -> Result<User> {
        let Credential::Google { id_token } = credential;
        if self.reject_credentials.load(Ordering::SeqCst) || id_token.is_none() {
            exn::bail!(ErrorKind::Credential);
        }
        let user = User::new(self.credential_email.clone());
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_anonymously(&self) -> Result<User> {
        self.anonymous_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_anonymous.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Network);
        }
        let user = User::anonymous();
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.set_current(None);
    }
}
