//! Per-key mutual exclusion.
//!
//! Every mutating inventory operation runs its read-modify-write inside the
//! critical section of its owner key. Different keys never wait on each other
//! beyond the short lookup in the shared map; an entry lives only while some
//! caller holds or waits for it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

type Slot = Arc<Mutex<()>>;

#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// A panic inside another holder's critical section does not poison the
    /// key: the unit guard protects no data, so the lock is simply taken over.
    pub fn with_lock<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let slot = self.slot(key);
        let _release = Release { locks: self, key, slot: &slot };
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn slot(&self, key: &K) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }
}

/// Drops the map entry when its last user leaves.
struct Release<'a, K: Eq + Hash> {
    locks: &'a KeyedLocks<K>,
    key: &'a K,
    slot: &'a Slot,
}

impl<K: Eq + Hash> Drop for Release<'_, K> {
    fn drop(&mut self) {
        let mut slots = self.locks.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus ours: nobody else is waiting.
        if Arc::strong_count(self.slot) == 2 {
            slots.remove(self.key);
        }
    }
}
