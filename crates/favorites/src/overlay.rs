use photos_store::PhotoId;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Process-lifetime favorite status overrides.
///
/// An entry exists only for photos whose status was changed during this
/// process. Absence means "trust the photo's own flag"; presence wins
/// unconditionally, even once the store has caught up (or failed to).
#[derive(Debug, Default)]
pub(crate) struct Overlay {
    entries: Mutex<HashMap<PhotoId, bool>>,
}
impl Overlay {
    pub(crate) fn get(&self, id: &PhotoId) -> Option<bool> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(id).copied()
    }

    pub(crate) fn set(&self, id: PhotoId, favorite: bool) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(id, favorite);
    }

    /// Overwrite every existing entry. Never creates new entries.
    pub(crate) fn set_all(&self, favorite: bool) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values_mut().for_each(|value| *value = favorite);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
