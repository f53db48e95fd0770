use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key mutual exclusion for read-check-write sequences.
///
/// A create-only `insert` or a versioned `update` protects one record.
/// Rules that look at several records of the same owner, such as "no two
/// overlapping vacations per employee", run their check and their write
/// while holding the owner's guard. Clones share the same set of locks.
pub struct KeyedGuard<K> {
    slots: Arc<Mutex<HashMap<K, Arc<Mutex<()>>>>>,
}

impl<K> Clone for KeyedGuard<K> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K> Default for KeyedGuard<K> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash> KeyedGuard<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder of `key` remains. The lock is released
    /// when the returned guard drops.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            // only the map still points at idle slots
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.lock_owned().await
    }
}
