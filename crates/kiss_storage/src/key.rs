//! Validated storage keys.

use crate::error::{StorageError, StorageResult};
use std::fmt;

/// Maximum key length in bytes.
///
/// Leaves room under the common 255-byte file name limit for the suffix of
/// the store's temporary files.
pub const MAX_KEY_LEN: usize = 200;

/// A key that is safe to use as a single file name under the store root.
///
/// # Invariants
///
/// - Non-empty and at most [`MAX_KEY_LEN`] bytes
/// - Contains no `/`, `\` or NUL
/// - Is not `.` or `..` and does not start with `.`
///
/// Together these guarantee that `root.join(key)` names a direct child of
/// `root`. The leading-dot rule also keeps the store's temporary files out of
/// the key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Validates `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key could escape the store
    /// root or is not a usable file name.
    pub fn new(key: impl Into<String>) -> StorageResult<Self> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::invalid_key(&key, "key is empty"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::invalid_key(&key, "key is too long"));
        }
        if key.contains(['/', '\\']) {
            return Err(StorageError::invalid_key(&key, "contains a path separator"));
        }
        if key.contains('\0') {
            return Err(StorageError::invalid_key(&key, "contains a NUL byte"));
        }
        if key == "." || key == ".." {
            return Err(StorageError::invalid_key(&key, "is a directory reference"));
        }
        if key.starts_with('.') {
            return Err(StorageError::invalid_key(&key, "starts with a dot"));
        }

        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> StorageResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> StorageResult<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::{Component, Path};

    #[test]
    fn accepts_plain_keys() {
        for key in ["cfg", "kiss-rules-share.json", "user@example.com", "a b c", "键"] {
            assert_eq!(StorageKey::new(key).unwrap().as_str(), key);
        }
    }

    #[test]
    fn rejects_traversal() {
        for key in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", "/abs", ".hidden", "a\0b"] {
            assert!(
                matches!(StorageKey::new(key), Err(StorageError::InvalidKey { .. })),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn rejects_long_keys() {
        assert!(StorageKey::new("k".repeat(MAX_KEY_LEN)).is_ok());
        assert!(StorageKey::new("k".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    proptest! {
        #[test]
        fn valid_keys_stay_under_root(key in "\\PC{1,64}") {
            if let Ok(key) = StorageKey::new(key) {
                let root = Path::new("/srv/data");
                let path = root.join(key.as_str());
                prop_assert_eq!(path.parent(), Some(root));
                let last = path.components().last();
                prop_assert!(matches!(last, Some(Component::Normal(_))));
            }
        }

        #[test]
        fn separators_always_rejected(prefix in "[a-z]{0,8}", sep in "[/\\\\]", suffix in "[a-z.]{0,8}") {
            let key = format!("{prefix}{sep}{suffix}");
            prop_assert!(StorageKey::new(key).is_err());
        }
    }
}
