//! Concurrent store handle
//!
//! [`Store`] puts a [`MemoryStore`] behind one reader-writer lock and owns the
//! optional expiry sweeper. Every operation is total: reads of missing keys
//! and typed reads of the wrong type degrade to `None` or the type's default,
//! deletes of missing keys do nothing.

use crate::config::StoreConfig;
use crate::store::{FromValue, MemoryStore, Value};
use crate::sweeper::{Sweeper, SweeperState};
use bytes::Bytes;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::trace;

/// A concurrency-safe, in-memory key-value store
///
/// Cloning a `Store` is cheap and yields another handle to the same map and
/// sweeper.
///
/// ```rust
/// use dream::Store;
///
/// let store = Store::new();
/// store.put("foo", "bar");
/// store.put("blah", 100i64);
///
/// assert_eq!(store.get_string("foo"), "bar");
///
/// store.delete("blah");
/// store.delete("blah");
/// assert_eq!(store.get_i64("blah"), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    map: Arc<RwLock<MemoryStore>>,
    sweeper: Sweeper,
}

impl Store {
    /// Create a store without automatic expiry
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store whose entries expire after `interval`
    ///
    /// Shorthand for a [`StoreConfig`] with only the cleanup interval set.
    pub fn with_cleanup(interval: Duration) -> Self {
        Self::with_config(StoreConfig::new().with_cleanup_interval(interval))
    }

    /// Create a store from a configuration
    ///
    /// A positive cleanup interval starts the background sweeper; the caller
    /// is expected to call [`Store::stop_cleanup`] during its own shutdown.
    pub fn with_config(config: StoreConfig) -> Self {
        let map = Arc::new(RwLock::new(MemoryStore::new()));

        let sweeper = if config.cleanup_enabled() {
            Sweeper::start(Arc::downgrade(&map), config.cleanup_interval)
        } else {
            Sweeper::inactive()
        };

        Store { map, sweeper }
    }

    // A poisoned lock only means another caller panicked; each mutation of
    // the map is a single insert/remove/retain, so the data is still whole.
    fn read(&self) -> RwLockReadGuard<'_, MemoryStore> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStore> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite `key`
    ///
    /// Resets the entry's timestamp, postponing its expiry by a full interval.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        trace!("put {} ({})", key, value.type_name());
        self.write().put(key, value);
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Remove `key` if present
    pub fn delete(&self, key: &str) {
        if self.write().delete(key) {
            trace!("delete {}", key);
        }
    }

    /// Check if `key` is present
    pub fn exists(&self, key: &str) -> bool {
        self.read().exists(key)
    }

    /// Get the value under `key` as `T`
    ///
    /// Returns `T::default()` if the key is missing or holds any other type.
    /// The two cases are deliberately indistinguishable; use [`Store::get`]
    /// to tell them apart.
    pub fn get_as<T: FromValue>(&self, key: &str) -> T {
        self.read().get_as(key)
    }

    /// String value, or `""`
    pub fn get_string(&self, key: &str) -> String {
        self.get_as(key)
    }

    /// Binary value, or empty bytes
    pub fn get_bytes(&self, key: &str) -> Bytes {
        self.get_as(key)
    }

    /// Boolean value, or `false`
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_as(key)
    }

    /// `isize` value, or 0
    pub fn get_isize(&self, key: &str) -> isize {
        self.get_as(key)
    }

    pub fn get_i8(&self, key: &str) -> i8 {
        self.get_as(key)
    }

    pub fn get_i16(&self, key: &str) -> i16 {
        self.get_as(key)
    }

    pub fn get_i32(&self, key: &str) -> i32 {
        self.get_as(key)
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.get_as(key)
    }

    /// `usize` value, or 0
    pub fn get_usize(&self, key: &str) -> usize {
        self.get_as(key)
    }

    pub fn get_u8(&self, key: &str) -> u8 {
        self.get_as(key)
    }

    pub fn get_u16(&self, key: &str) -> u16 {
        self.get_as(key)
    }

    pub fn get_u32(&self, key: &str) -> u32 {
        self.get_as(key)
    }

    pub fn get_u64(&self, key: &str) -> u64 {
        self.get_as(key)
    }

    /// `f32` value, or 0.0
    pub fn get_f32(&self, key: &str) -> f32 {
        self.get_as(key)
    }

    /// `f64` value, or 0.0
    pub fn get_f64(&self, key: &str) -> f64 {
        self.get_as(key)
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the current keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.read().keys()
    }

    /// Remove all keys
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Stop the background sweeper
    ///
    /// After this, entries only leave the store through [`Store::delete`] or
    /// [`Store::clear`]. A no-op if no sweeper was started or it was already
    /// stopped. Affects every clone of this store.
    pub fn stop_cleanup(&self) {
        self.sweeper.stop();
    }

    /// Lifecycle state of the background sweeper
    pub fn cleanup_state(&self) -> SweeperState {
        self.sweeper.state()
    }

    /// Configured cleanup interval, zero when expiry is disabled
    pub fn cleanup_interval(&self) -> Duration {
        self.sweeper.interval()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
