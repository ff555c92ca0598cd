//! In-memory storage implementation

use super::entry::Entry;
use super::value::{FromValue, Value};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::time::{Duration, Instant};

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<String, Entry, BuildHasherDefault<SipHasher13>>;

/// In-memory key-value map
///
/// This is the single-threaded storage engine. It knows nothing about
/// locking or background tasks; [`crate::Store`] wraps it in a lock and
/// drives expiry through [`MemoryStore::purge_older_than`].
#[derive(Debug)]
pub struct MemoryStore {
    /// The main storage map
    store: StoreMap,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Insert or overwrite a key, stamping it with the current instant
    ///
    /// Returns true if the key was not present before.
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> bool {
        self.store.insert(key.into(), Entry::new(value)).is_none()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key).map(|entry| &entry.value)
    }

    /// Get a value by key as `T`, or `T::default()` on absence or mismatch
    pub fn get_as<T: FromValue>(&self, key: &str) -> T {
        self.get(key)
            .and_then(Value::extract::<T>)
            .unwrap_or_default()
    }

    /// Delete a key, returns true if the key existed
    pub fn delete(&mut self, key: &str) -> bool {
        self.store.remove(key).is_some()
    }

    /// Check if a key exists
    pub fn exists(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Remove all keys
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get all keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }

    /// Remove every entry whose age at `now` exceeds `max_age`
    /// Returns the number of keys removed
    pub fn purge_older_than(&mut self, max_age: Duration, now: Instant) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_older_than(max_age, now));
        before - self.store.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
