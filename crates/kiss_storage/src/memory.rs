//! In-memory record store for testing.

use crate::backend::RecordStore;
use crate::error::StorageResult;
use crate::key::StorageKey;
use crate::locks::{KeyGuard, KeyLocks};
use crate::record::Record;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory record store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral servers that don't need persistence
///
/// # Example
///
/// ```rust
/// use kiss_storage::{InMemoryStore, Record, RecordStore, StorageKey};
///
/// let store = InMemoryStore::new();
/// store.put(&Record::new("cfg", "{}", 1)).unwrap();
/// assert_eq!(store.len(), 1);
/// assert!(store.get(&StorageKey::new("other").unwrap()).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Record>>,
    locks: KeyLocks,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
            locks: KeyLocks::new(),
        }
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, key: &StorageKey) -> StorageResult<Option<Record>> {
        Ok(self.records.read().get(key.as_str()).cloned())
    }

    fn put(&self, record: &Record) -> StorageResult<()> {
        let key = StorageKey::new(record.key.as_str())?;
        self.records.write().insert(key.into_inner(), record.clone());
        Ok(())
    }

    fn lock(&self, key: &StorageKey) -> KeyGuard<'_> {
        self.locks.lock(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    fn key(s: &str) -> StorageKey {
        StorageKey::new(s).unwrap()
    }

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert!(store.get(&key("cfg")).unwrap().is_none());
    }

    #[test]
    fn memory_put_and_get() {
        let store = InMemoryStore::new();
        let record = Record::new("cfg", "{\"a\":1}", 100);
        store.put(&record).unwrap();
        assert_eq!(store.get(&key("cfg")).unwrap(), Some(record));
    }

    #[test]
    fn memory_put_overwrites() {
        let store = InMemoryStore::new();
        store.put(&Record::new("cfg", "old", 1)).unwrap();
        store.put(&Record::new("cfg", "new", 2)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key("cfg")).unwrap().unwrap().value, "new");
    }

    #[test]
    fn memory_rejects_bad_key() {
        let store = InMemoryStore::new();
        let result = store.put(&Record::new("../x", "v", 1));
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn memory_with_records() {
        let store = InMemoryStore::with_records([Record::new("a", "1", 1), Record::new("b", "2", 2)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&key("b")).unwrap().unwrap().update_at, 2);
    }
}
