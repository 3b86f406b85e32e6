use crate::error::{ErrorKind, Result};
use crate::listener::{ListenerHandle, Listeners};
use crate::overlay::Overlay;
use crate::write::{PendingWrite, Scope};
use exn::ResultExt;
use futures::{Stream, StreamExt};
use photos_store::{FavoriteRecord, Photo, Repository, SortOrder};
use std::fmt;
use std::sync::Arc;
use time::UtcDateTime;
use tokio::runtime::Handle;

/// Favorites coordinator.
///
/// Owns the in-memory overlay that makes a toggle visible instantly, the
/// listener list, and the scope background store writes run in. Cheap to
/// clone; clones share all of it. Build one per process and hand clones to
/// whoever needs favorites.
///
/// The two read paths can disagree:
/// - [`is_favorite`](Self::is_favorite) consults the overlay first and is
///   what UI should use for immediate feedback.
/// - [`is_favorite_from_store`](Self::is_favorite_from_store),
///   [`populate_favorite`](Self::populate_favorite) and
///   [`query_favorites`](Self::query_favorites) only see the store.
#[derive(Clone)]
pub struct Favorites {
    inner: Arc<Inner>,
}

struct Inner {
    store: Repository,
    overlay: Overlay,
    listeners: Listeners,
    scope: Scope,
}

impl fmt::Debug for Favorites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Favorites")
            .field("overlay_entries", &self.inner.overlay.len())
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Favorites {
    /// Create a coordinator whose background writes run on the current Tokio
    /// runtime.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime; use
    /// [`with_runtime`](Self::with_runtime) from plain threads.
    pub fn new(store: Repository) -> Self {
        Self::with_runtime(store, Handle::current())
    }

    /// Create a coordinator whose background writes run on `runtime`.
    pub fn with_runtime(store: Repository, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                overlay: Overlay::default(),
                listeners: Listeners::default(),
                scope: Scope::new(runtime),
            }),
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener. Subscribing the same listener twice means it is
    /// notified twice.
    pub fn subscribe(&self, listener: ListenerHandle) {
        self.inner.listeners.subscribe(listener);
    }

    /// Remove one registration of `listener`. Returns `false` if it wasn't
    /// registered.
    pub fn unsubscribe(&self, listener: &ListenerHandle) -> bool {
        self.inner.listeners.unsubscribe(listener)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Live favorites list from the store, sorted by date added.
    ///
    /// Every photo yielded has `favorite` set, whatever the overlay says:
    /// toggles show up here once their write has landed, not before.
    pub fn query_favorites(&self, sort: SortOrder) -> impl Stream<Item = Result<Vec<Photo>>> + Send + 'static {
        self.inner.store.watch_favorites(sort).map(|records| -> Result<Vec<Photo>> {
            let records = records.or_raise(|| ErrorKind::Store)?;
            Ok(records.into_iter().map(|record| Photo::from(record).with_favorite(true)).collect())
        })
    }

    /// Favorite status as the user should see it right now.
    ///
    /// The overlay value wins if this photo was changed during this process,
    /// otherwise the photo's own (last persisted) flag is used.
    pub fn is_favorite(&self, photo: &Photo) -> bool {
        self.inner.overlay.get(&photo.id).unwrap_or(photo.favorite)
    }

    /// Favorite status according to the store alone, ignoring the overlay.
    pub async fn is_favorite_from_store(&self, photo: &Photo) -> Result<bool> {
        let record = self.inner.store.get_by_id(&photo.id).await.or_raise(|| ErrorKind::Store)?;
        Ok(record.is_some())
    }

    /// Set `photo.favorite` from the store (not the overlay) and hand it back.
    pub async fn populate_favorite(&self, mut photo: Photo) -> Result<Photo> {
        photo.favorite = self.is_favorite_from_store(&photo).await?;
        Ok(photo)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Flip the favorite status of `photo`.
    ///
    /// The new status is visible through [`is_favorite`](Self::is_favorite)
    /// and delivered to every listener before this returns. The store write
    /// (insert when favoriting, soft delete otherwise) happens in the
    /// background; if it fails the failure is logged and the overlay keeps
    /// the new status anyway.
    pub fn toggle_favorite(&self, photo: &Photo) -> PendingWrite {
        let favorite = !self.is_favorite(photo);
        self.inner.overlay.set(photo.id.clone(), favorite);
        tracing::debug!(photo = %photo.id, favorite, "Favorite toggled");
        self.inner.listeners.notify(|l| l.on_favorite_changed(photo, favorite));

        let store = self.inner.store.clone();
        let record = FavoriteRecord::from_photo(photo, UtcDateTime::now());
        self.inner.scope.spawn("toggle favorite", async move {
            let result = if favorite {
                store.insert(&record).await
            } else {
                store.soft_delete(&record.id).await.map(|_| ())
            };
            match result {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(photo = %record.id, favorite, error = ?err, "Failed to persist favorite change");
                    false
                },
            }
        })
    }

    /// Soft-delete every favorite.
    ///
    /// Returns `false` without touching anything (and without notifying) if
    /// the store holds no rows at all. Otherwise every photo already in the
    /// overlay is overridden to "not favorite", listeners get one bulk
    /// notification, and `true` is returned. Photos that were never toggled
    /// in this process get no overlay entry.
    pub async fn mark_all_as_removed(&self) -> Result<bool> {
        let count = self.inner.store.count().await.or_raise(|| ErrorKind::Store)?;
        if count == 0 {
            return Ok(false);
        }
        self.inner.store.mark_all_as_deleted().await.or_raise(|| ErrorKind::Store)?;
        self.inner.overlay.set_all(false);
        tracing::debug!(count, "All favorites marked as removed");
        self.inner.listeners.notify(|l| l.on_favorites_changed());
        Ok(true)
    }

    /// Undo [`mark_all_as_removed`](Self::mark_all_as_removed) in the
    /// background.
    ///
    /// Once the store write lands, every photo already in the overlay is
    /// overridden to "favorite" and listeners get a bulk notification. Unlike
    /// `mark_all_as_removed` there is no "nothing to undo" check: listeners
    /// are notified even when the store is empty.
    pub fn unmark_all_as_removed(&self) -> PendingWrite {
        let inner = Arc::clone(&self.inner);
        self.inner.scope.spawn("unmark all favorites", async move {
            match inner.store.unmark_all_as_deleted().await {
                Ok(count) => {
                    inner.overlay.set_all(true);
                    tracing::debug!(count, "All favorites restored");
                    inner.listeners.notify(|l| l.on_favorites_changed());
                    true
                },
                Err(err) => {
                    tracing::warn!(error = ?err, "Failed to restore removed favorites");
                    false
                },
            }
        })
    }

    /// Delete every favorite row for good, in the background.
    ///
    /// The overlay is left alone and nobody is notified, so photos toggled
    /// earlier in this process keep reporting their overlay status until
    /// they are toggled again.
    pub fn remove_all_favorites(&self) -> PendingWrite {
        let store = self.inner.store.clone();
        self.inner.scope.spawn("remove all favorites", async move {
            match store.delete_all().await {
                Ok(count) => {
                    tracing::debug!(count, "All favorites deleted");
                    true
                },
                Err(err) => {
                    tracing::warn!(error = ?err, "Failed to delete favorites");
                    false
                },
            }
        })
    }

    /// Cancel in-flight background writes and wait for them to wind down.
    ///
    /// Writes requested afterwards are skipped (and logged); overlay updates
    /// and notifications keep working.
    pub async fn shutdown(&self) {
        self.inner.scope.shutdown().await;
    }
}
