//! Keyed lock table for per-key read-modify-write.

use crate::key::StorageKey;
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;

/// A table of per-key mutual exclusion.
///
/// At most one [`KeyGuard`] exists per key at any time. Guards on different
/// keys never block each other. The table only holds keys that are currently
/// locked, so it does not grow with the number of keys ever seen.
#[derive(Debug, Default)]
pub struct KeyLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl KeyLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until `key` is free, then locks it.
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn lock(&self, key: &StorageKey) -> KeyGuard<'_> {
        let mut held = self.held.lock();
        while held.contains(key.as_str()) {
            self.released.wait(&mut held);
        }
        held.insert(key.as_str().to_string());

        KeyGuard {
            locks: self,
            key: key.as_str().to_string(),
        }
    }

    /// Returns true if `key` is currently locked.
    #[must_use]
    pub fn is_locked(&self, key: &StorageKey) -> bool {
        self.held.lock().contains(key.as_str())
    }

    /// Returns the number of keys currently locked.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }
}

/// Exclusive hold on one key of a [`KeyLocks`] table.
#[derive(Debug)]
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
}

impl KeyGuard<'_> {
    /// Returns the locked key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.key);
        self.locks.released.notify_all();
    }
}
