//! In-memory geometry cache.
//!
//! Lives as long as the owning resolver. Each key holds a write-once slot, so a
//! positive or negative outcome is never replaced, and concurrent callers for the
//! same key share one fetch.

use super::types::{CacheKey, Lookup};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;

pub(crate) type Slot = Arc<OnceCell<Lookup>>;

#[derive(Default)]
pub struct GeometryCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        // Holders never panic mid-update, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The slot for `key`, created empty on first use.
    pub(crate) fn slot(&self, key: &CacheKey) -> Slot {
        self.lock().entry(key.clone()).or_default().clone()
    }

    /// Settled outcome for `key`, if any. Never waits on an in-flight fetch.
    pub fn get(&self, key: &CacheKey) -> Option<Lookup> {
        self.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Drop every entry. In-flight fetches complete into orphaned slots.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of settled entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|s| s.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
