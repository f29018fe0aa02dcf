//! The versioned record kept per key.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key/value/timestamp triple.
///
/// `update_at` is the record's version in Unix seconds. Zero means the
/// client left version assignment to the server.
///
/// The serialized field names (`key`, `value`, `updateAt`) are shared by the
/// wire format and the on-disk format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Storage key.
    pub key: String,
    /// Opaque payload, usually a JSON document. Stored verbatim.
    pub value: String,
    /// Version in Unix seconds.
    #[serde(rename = "updateAt", default, deserialize_with = "deserialize_update_at")]
    pub update_at: i64,
}

impl Record {
    /// Creates a new record.
    pub fn new(key: impl Into<String>, value: impl Into<String>, update_at: i64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            update_at,
        }
    }

    /// Returns true if this record's version is strictly newer than `other`.
    #[must_use]
    pub fn is_newer_than(&self, other: &Record) -> bool {
        self.update_at > other.update_at
    }
}

/// Reads `updateAt` leniently: `null` and an empty string mean zero, and
/// form bodies carry the number as text.
fn deserialize_update_at<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct UpdateAtVisitor;

    impl<'de> Visitor<'de> for UpdateAtVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a Unix timestamp in seconds")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            if v.is_empty() {
                return Ok(0);
            }
            v.parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(UpdateAtVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_names() {
        let record = Record::new("cfg", "{\"a\":1}", 100);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"key":"cfg","value":"{\"a\":1}","updateAt":100}"#);
    }

    #[test]
    fn missing_update_at_defaults_to_zero() {
        let record: Record = serde_json::from_str(r#"{"key":"k","value":"v"}"#).unwrap();
        assert_eq!(record.update_at, 0);
    }

    #[test]
    fn null_or_empty_update_at_is_zero() {
        let record: Record =
            serde_json::from_str(r#"{"key":"k","value":"v","updateAt":null}"#).unwrap();
        assert_eq!(record.update_at, 0);

        let record: Record =
            serde_json::from_str(r#"{"key":"k","value":"v","updateAt":""}"#).unwrap();
        assert_eq!(record.update_at, 0);
    }

    #[test]
    fn update_at_rejects_garbage() {
        for body in [
            r#"{"key":"k","value":"v","updateAt":"soon"}"#,
            r#"{"key":"k","value":"v","updateAt":1.5}"#,
            r#"{"key":"k","value":"v","updateAt":18446744073709551615}"#,
            r#"{"key":"k","value":"v","updateAt":[]}"#,
        ] {
            assert!(serde_json::from_str::<Record>(body).is_err(), "accepted {body}");
        }
    }

    #[test]
    fn newer_is_strict() {
        let a = Record::new("k", "v", 100);
        let b = Record::new("k", "w", 100);
        assert!(!a.is_newer_than(&b));
        assert!(Record::new("k", "w", 101).is_newer_than(&a));
    }
}
