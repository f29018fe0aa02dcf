//! File-per-key record store for persistent storage.

use crate::backend::RecordStore;
use crate::error::StorageResult;
use crate::key::StorageKey;
use crate::locks::{KeyGuard, KeyLocks};
use crate::record::Record;
use std::fs::{self, DirBuilder, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A record store keeping one JSON file per key under a root directory.
///
/// Records survive process restarts. The root directory is created on first
/// use if it does not exist.
///
/// # Durability
///
/// `put` writes to a temporary file in the root, syncs it, then renames it
/// over the target. Readers see either the old record or the new one, never
/// a partial write.
///
/// # Example
///
/// ```no_run
/// use kiss_storage::{FileStore, Record, RecordStore, StorageKey};
///
/// let store = FileStore::new("data");
/// store.put(&Record::new("cfg", "{}", 1)).unwrap();
/// let record = store.get(&StorageKey::new("cfg").unwrap()).unwrap();
/// assert!(record.is_some());
/// ```
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl FileStore {
    /// Creates a store rooted at `root`.
    ///
    /// Nothing is touched on disk until the first read or write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyLocks::new(),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file backing `key`.
    #[must_use]
    pub fn record_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Creates the root directory if it is missing.
    fn ensure_root(&self) -> io::Result<()> {
        if self.root.is_dir() {
            return Ok(());
        }

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.root)
    }

    fn temp_path(&self, key: &StorageKey) -> PathBuf {
        self.root
            .join(format!(".{}.{}.tmp", key.as_str(), uuid::Uuid::new_v4().simple()))
    }

    fn write_atomic(&self, key: &StorageKey, data: &[u8]) -> io::Result<()> {
        let temp_path = self.temp_path(key);

        let written = write_synced(&temp_path, data)
            .and_then(|()| fs::rename(&temp_path, self.record_path(key)));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        self.sync_root()
    }

    /// Syncs the root so the rename is durable.
    #[cfg(unix)]
    fn sync_root(&self) -> io::Result<()> {
        File::open(&self.root)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_root(&self) -> io::Result<()> {
        Ok(())
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl RecordStore for FileStore {
    fn get(&self, key: &StorageKey) -> StorageResult<Option<Record>> {
        self.ensure_root()?;
        let path = self.record_path(key);

        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => return Ok(None),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Record>(&data) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(key = %key, error = %e, "malformed record file, treating as empty");
                Ok(Some(Record::new(key.as_str(), "", 0)))
            }
        }
    }

    fn put(&self, record: &Record) -> StorageResult<()> {
        let key = StorageKey::new(record.key.as_str())?;
        self.ensure_root()?;

        let data = serde_json::to_vec_pretty(record)?;
        self.write_atomic(&key, &data)?;

        debug!(key = %key, update_at = record.update_at, bytes = data.len(), "record written");
        Ok(())
    }

    fn lock(&self, key: &StorageKey) -> KeyGuard<'_> {
        self.locks.lock(key)
    }
}
