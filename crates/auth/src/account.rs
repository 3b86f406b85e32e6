use crate::error::Result;
use crate::provider::{Credential, ProviderHandle, SignInOutcome};
use crate::status::{LoginListenerHandle, LoginStatus};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Tracks whether the user is signed in and tells listeners every time the
/// status is assigned.
///
/// ```text
/// NotSet ──new()──▶ SignedOut | SignedIn
/// SignedOut ──sign_in_with_google()──▶ SigningIn
/// SigningIn ──handle_sign_in_result()──▶ SignedIn | SignedOut (cancelled) | SignInError
/// any ──sign_out()──▶ SignedOut
/// ```
///
/// Anonymous sessions are handled by [`sign_in_anonymously`](Self::sign_in_anonymously)
/// and never show up in [`login_status`](Self::login_status).
pub struct AccountManager {
    provider: ProviderHandle,
    status: Mutex<LoginStatus>,
    listeners: Mutex<Vec<LoginListenerHandle>>,
}

impl fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountManager").field("status", &self.login_status()).finish_non_exhaustive()
    }
}

impl AccountManager {
    /// Create a manager and derive the initial status from the provider's
    /// current (non-anonymous) session.
    pub fn new(provider: ProviderHandle) -> Self {
        let manager = Self {
            provider,
            status: Mutex::new(LoginStatus::NotSet),
            listeners: Mutex::new(Vec::new()),
        };
        let initial = match manager.signed_in_email() {
            Some(email) => LoginStatus::SignedIn(email),
            None => LoginStatus::SignedOut,
        };
        manager.set_status(initial);
        manager
    }

    pub fn login_status(&self) -> LoginStatus {
        self.status.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Register a listener. Subscribing the same listener twice means it is
    /// notified twice.
    pub fn subscribe(&self, listener: LoginListenerHandle) {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).push(listener);
    }

    /// Remove one registration of `listener`. Returns `false` if it wasn't
    /// registered.
    pub fn unsubscribe(&self, listener: &LoginListenerHandle) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let target = Arc::as_ptr(listener).cast::<()>();
        match listeners.iter().position(|l| std::ptr::eq(Arc::as_ptr(l).cast::<()>(), target)) {
            Some(index) => {
                listeners.remove(index);
                true
            },
            None => false,
        }
    }

    /// Start the interactive Google sign-in flow.
    ///
    /// The flow's result must be passed to
    /// [`handle_sign_in_result`](Self::handle_sign_in_result).
    pub fn sign_in_with_google(&self) {
        self.provider.launch_sign_in();
        self.set_status(LoginStatus::SigningIn);
    }

    /// Finish a Google sign-in with the outcome of the interactive flow.
    ///
    /// A returned account is exchanged with the identity provider for a full
    /// session. The user backing out leaves them signed out; any other
    /// failure ends in [`LoginStatus::SignInError`] with the detail only
    /// logged.
    pub async fn handle_sign_in_result(&self, outcome: SignInOutcome) {
        let status = match outcome {
            Ok(account) => {
                let credential = Credential::Google { id_token: account.id_token };
                match self.provider.sign_in_with_credential(credential).await {
                    Ok(user) => LoginStatus::SignedIn(user.email.unwrap_or_default()),
                    Err(err) => {
                        tracing::warn!(error = ?err, "Identity provider rejected Google credential");
                        LoginStatus::SignInError
                    },
                }
            },
            Err(failure) if failure.is_cancelled() => LoginStatus::SignedOut,
            Err(failure) => {
                tracing::warn!(status_code = failure.status_code, "Google sign-in failed");
                LoginStatus::SignInError
            },
        };
        self.set_status(status);
    }

    pub fn sign_out(&self) {
        self.provider.sign_out();
        self.set_status(LoginStatus::SignedOut);
    }

    /// Make sure *some* session exists, then run `then`.
    ///
    /// With an existing session (anonymous or not) `then` runs straight away.
    /// Otherwise an anonymous session is requested and `then` runs only if
    /// that succeeds. The login status is never touched.
    pub async fn sign_in_anonymously(&self, then: impl FnOnce()) -> Result<()> {
        if self.provider.current_user().is_none() {
            if let Err(err) = self.provider.sign_in_anonymously().await {
                tracing::debug!(error = ?err, "Anonymous sign-in failed");
                return Err(err);
            }
        }
        then();
        Ok(())
    }

    fn signed_in_email(&self) -> Option<String> {
        self.provider
            .current_user()
            .filter(|user| !user.anonymous)
            .map(|user| user.email.unwrap_or_default())
    }

    /// Assign the status and notify every listener, even if nothing changed.
    fn set_status(&self, status: LoginStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status.clone();
        tracing::debug!(%status, "Login status assigned");
        let snapshot = self.listeners.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for listener in &snapshot {
            listener.on_login_status_changed(&status);
        }
    }
}
