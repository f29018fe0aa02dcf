//! Record store trait definition.

use crate::error::StorageResult;
use crate::key::StorageKey;
use crate::locks::KeyGuard;
use crate::record::Record;

/// A store holding at most one [`Record`] per key.
///
/// Stores own the representation of records; callers only ever see
/// `Record` values.
///
/// # Invariants
///
/// - `get` after a successful `put` returns an equal record
/// - `put` fully replaces whatever was stored for the key
/// - A reader never observes a partially written record
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Read-modify-write
///
/// `get` and `put` are individually consistent, but a caller that decides
/// what to write based on what it read must hold [`RecordStore::lock`] for
/// the key across both calls.
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait RecordStore: Send + Sync {
    /// Reads the record stored under `key`.
    ///
    /// Returns `Ok(None)` if no record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &StorageKey) -> StorageResult<Option<Record>>;

    /// Writes `record`, replacing any previous record with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the record key is invalid or the write fails.
    fn put(&self, record: &Record) -> StorageResult<()>;

    /// Locks `key` for a read-modify-write sequence.
    ///
    /// Blocks while another guard for the same key is alive.
    fn lock(&self, key: &StorageKey) -> KeyGuard<'_>;
}
