use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Per-key async mutual exclusion.
///
/// Multiple keys are always acquired in sorted order, so two callers locking
/// overlapping key sets cannot deadlock. Slots nobody holds or waits on are
/// dropped on the next acquisition.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

/// Holds every lock taken by one [`KeyedLocks::lock`] call until dropped.
#[must_use = "the keys are unlocked as soon as the guard is dropped"]
pub struct KeyedGuard {
    _held: Vec<OwnedMutexGuard<()>>,
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
    K: Eq + Hash + Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock all `keys`. Duplicates are collapsed.
    pub async fn lock(&self, keys: impl IntoIterator<Item = K>) -> KeyedGuard {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let slots: Vec<Slot> = {
            let mut map = self.map();
            map.retain(|_, slot| Arc::strong_count(slot) > 1);
            keys.into_iter()
                .map(|k| Arc::clone(map.entry(k).or_default()))
                .collect()
        };

        let mut held = Vec::with_capacity(slots.len());
        for slot in slots {
            held.push(slot.lock_owned().await);
        }
        KeyedGuard { _held: held }
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map only holds `Arc`s, a panic while it was locked cannot leave it inconsistent.
    fn map(&self) -> MutexGuard<'_, HashMap<K, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
