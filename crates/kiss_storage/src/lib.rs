//! # KISS Storage
//!
//! File-per-key record store for the KISS sync server.
//!
//! This crate provides the persistence layer behind `/sync` and `/rules`.
//! A store holds at most one [`Record`] per key. Values are **opaque** -
//! the store never parses or validates the payload it keeps.
//!
//! ## Design Principles
//!
//! - One record per key, fully overwritten on every write
//! - Keys are validated into a [`StorageKey`] before touching the backing store
//! - Per-key locking lets callers serialize read-modify-write sequences
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral storage
//! - [`FileStore`] - One JSON file per key under a root directory
//!
//! ## Example
//!
//! ```rust
//! use kiss_storage::{InMemoryStore, Record, RecordStore, StorageKey};
//!
//! let store = InMemoryStore::new();
//! let key = StorageKey::new("cfg").unwrap();
//!
//! let _guard = store.lock(&key);
//! store.put(&Record::new("cfg", "{\"a\":1}", 100)).unwrap();
//! assert_eq!(store.get(&key).unwrap().unwrap().update_at, 100);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod backend;
mod error;
mod file;
mod key;
mod locks;
mod memory;
mod record;

pub use backend::RecordStore;
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use key::{StorageKey, MAX_KEY_LEN};
pub use locks::{KeyGuard, KeyLocks};
pub use memory::InMemoryStore;
pub use record::Record;
