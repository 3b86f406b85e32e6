use photos_store::Photo;
use std::sync::{Arc, Mutex, PoisonError};

/// Observer of favorite status changes.
///
/// Callbacks run synchronously on whichever thread made the change, with no
/// internal lock held, so a listener is free to subscribe or unsubscribe
/// (itself included) from inside a callback.
pub trait FavoritesListener: Send + Sync {
    /// A single photo was toggled to `favorite`.
    fn on_favorite_changed(&self, photo: &Photo, favorite: bool);

    /// Favorites changed in bulk (all removed or all restored).
    fn on_favorites_changed(&self);
}

/// Shared handle to a registered [`FavoritesListener`].
pub type ListenerHandle = Arc<dyn FavoritesListener>;

/// Ordered listener list with snapshot-then-notify semantics.
///
/// Duplicates are allowed: a listener subscribed twice is notified twice.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Mutex<Vec<ListenerHandle>>,
}
impl Listeners {
    pub(crate) fn subscribe(&self, listener: ListenerHandle) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(listener);
    }

    /// Remove the first registration of `listener` (compared by pointer).
    pub(crate) fn unsubscribe(&self, listener: &ListenerHandle) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                entries.remove(index);
                true
            },
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Call `f` for every listener registered at the time of the call.
    ///
    /// Changes to the list made by a listener apply from the next notification.
    pub(crate) fn notify(&self, f: impl Fn(&dyn FavoritesListener)) {
        let snapshot = self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for listener in &snapshot {
            f(listener.as_ref());
        }
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);
    impl FavoritesListener for Counter {
        fn on_favorite_changed(&self, _photo: &Photo, _favorite: bool) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn on_favorites_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let listeners = Listeners::default();
        let counter = Arc::new(Counter::default());
        listeners.subscribe(counter.clone());
        listeners.subscribe(counter.clone());
        listeners.notify(|l| l.on_favorites_changed());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_removes_one_registration() {
        let listeners = Listeners::default();
        let counter = Arc::new(Counter::default());
        let handle: ListenerHandle = counter.clone();
        listeners.subscribe(handle.clone());
        listeners.subscribe(handle.clone());
        assert!(listeners.unsubscribe(&handle));
        assert_eq!(listeners.len(), 1);
        assert!(listeners.unsubscribe(&handle));
        assert!(!listeners.unsubscribe(&handle));
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_unsubscribe_ignores_other_listeners() {
        let listeners = Listeners::default();
        let kept: ListenerHandle = Arc::new(Counter::default());
        let stranger: ListenerHandle = Arc::new(Counter::default());
        listeners.subscribe(kept);
        assert!(!listeners.unsubscribe(&stranger));
        assert_eq!(listeners.len(), 1);
    }
}
