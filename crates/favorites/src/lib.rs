//! Favorites coordinator.
//!
//! The record store is the source of truth for favorite status, but its read
//! path only reflects a write once the write has landed. The UI can't wait for
//! that, so [`Favorites`] keeps a process-lifetime overlay of every status it
//! changed, updates it synchronously, tells its listeners, and only then sends
//! the write to the store in the background.
//!
//! Because the overlay is never reconciled with the store, the two can
//! disagree for a while (or for good, if a write fails). That is accepted:
//! overlay-aware and store-only reads are separate operations so callers pick
//! the one they need.

pub mod error;
mod favorites;
mod listener;
mod overlay;
mod write;

pub use crate::favorites::Favorites;
pub use crate::listener::{FavoritesListener, ListenerHandle};
pub use crate::write::PendingWrite;
pub use photos_store::{Photo, PhotoId, PhotoSource, SortOrder};
