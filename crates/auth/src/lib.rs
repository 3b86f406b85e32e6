//! Account sign-in state.
//!
//! [`AccountManager`] holds the app's view of who is signed in, driven by an
//! external [`IdentityProvider`](provider::IdentityProvider). Listeners are
//! told about every status assignment. Anonymous sessions exist only so
//! that backend calls are authorised; they never change [`LoginStatus`].

mod account;
pub mod error;
pub mod provider;
mod status;

pub use crate::account::AccountManager;
pub use crate::status::{LoginListener, LoginListenerHandle, LoginStatus};
