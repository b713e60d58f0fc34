//! Catalog entries: one record per object, keyed by path.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commit::Metadata;
use crate::error::TypeError;

/// A catalog path.
///
/// Paths order byte-lexicographically (the `Ord` of the underlying UTF-8
/// string). Every entry stream in Inlet is sorted in this order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    /// Create a path, rejecting the empty string.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        if path.is_empty() {
            return Err(TypeError::EmptyPath);
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this path lies under `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Path {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Descriptor of one stored object, as the catalog records it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Physical location of the object data (e.g. `s3://bucket/key`).
    pub address: String,
    /// Last modification time reported by the source.
    pub last_modified: DateTime<Utc>,
    /// Object size in bytes.
    pub size: u64,
    /// Content checksum (ETag) reported by the source.
    pub etag: String,
    /// User metadata attached to the object.
    #[serde(default)]
    pub metadata: Metadata,
    /// MIME type, when the source knows it.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// An [`Entry`] together with its path. The unit flowing through every
/// entry stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub path: Path,
    pub entry: Entry,
}

impl EntryRecord {
    pub fn new(path: Path, entry: Entry) -> Self {
        Self { path, entry }
    }
}
