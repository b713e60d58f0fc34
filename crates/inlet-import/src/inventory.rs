//! Raw inventory records and the streams that carry them.
//!
//! An inventory is a bulk enumeration of objects in external storage,
//! sorted by key. Records here are source-shaped; [`crate::convert`] turns
//! them into catalog entries.

use std::cmp::Ordering;
use std::fmt;
use std::io::BufRead;

use chrono::{DateTime, Utc};
use inlet_types::Metadata;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// One row of a bulk inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Bucket holding the object; used to derive an address when
    /// `physical_address` is absent.
    #[serde(default)]
    pub bucket: String,
    /// Object key; becomes the catalog path.
    pub key: String,
    /// Size in bytes as reported by the inventory. Negative sizes are
    /// malformed.
    pub size: i64,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub physical_address: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ImportRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size: i64, checksum: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size,
            checksum: checksum.into(),
            last_modified: None,
            physical_address: None,
            content_type: None,
            metadata: Metadata::new(),
        }
    }

    /// The catalog path this record lands at.
    pub fn path(&self) -> &str {
        &self.key
    }

    /// Same object content as `other`, judged by checksum and size.
    fn same_content(&self, other: &Self) -> bool {
        self.checksum == other.checksum && self.size == other.size
    }
}

/// A single-pass stream of inventory records, sorted by key.
pub struct InventoryIterator {
    inner: Box<dyn Iterator<Item = ImportResult<ImportRecord>> + Send>,
}

impl InventoryIterator {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ImportResult<ImportRecord>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(records.into_iter()),
        }
    }

    pub fn from_records(records: Vec<ImportRecord>) -> Self {
        Self::new(records.into_iter().map(Ok))
    }

    /// Read a JSON-lines manifest: one [`ImportRecord`] object per line.
    /// Blank lines are skipped; a malformed line yields
    /// [`ImportError::Inventory`] naming its line number.
    pub fn from_json_lines<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::new(
            reader
                .lines()
                .enumerate()
                .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
                .map(|(idx, line)| -> ImportResult<ImportRecord> {
                    let line = line.map_err(|e| ImportError::Inventory(format!("line {}: {e}", idx + 1)))?;
                    serde_json::from_str(&line)
                        .map_err(|e| ImportError::Inventory(format!("line {}: {e}", idx + 1)))
                }),
        )
    }
}

impl Iterator for InventoryIterator {
    type Item = ImportResult<ImportRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for InventoryIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryIterator").finish_non_exhaustive()
    }
}

/// What happened to an object between two inventories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    Added,
    Changed,
    Deleted,
}

/// A record that differs between a previous and a current inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRecord {
    /// The current record, or the previous one for [`DiffKind::Deleted`].
    pub record: ImportRecord,
    pub kind: DiffKind,
}

/// Streams the differences between two key-sorted inventories.
///
/// Unchanged records (same checksum and size) are skipped. This is the input
/// of diff-based import backends; the catalog backend rejects it.
#[derive(Debug)]
pub struct DiffIterator {
    previous: InventoryIterator,
    current: InventoryIterator,
    previous_head: Option<ImportRecord>,
    current_head: Option<ImportRecord>,
    done: bool,
}

impl DiffIterator {
    pub fn new(previous: InventoryIterator, current: InventoryIterator) -> Self {
        Self {
            previous,
            current,
            previous_head: None,
            current_head: None,
            done: false,
        }
    }

    fn fill(slot: &mut Option<ImportRecord>, source: &mut InventoryIterator) -> ImportResult<()> {
        if slot.is_none() {
            *slot = source.next().transpose()?;
        }
        Ok(())
    }

    fn step(&mut self) -> ImportResult<Option<DiffRecord>> {
        loop {
            Self::fill(&mut self.previous_head, &mut self.previous)?;
            Self::fill(&mut self.current_head, &mut self.current)?;

            let order = match (&self.previous_head, &self.current_head) {
                (None, None) => return Ok(None),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(p), Some(c)) => p.key.cmp(&c.key),
            };

            match order {
                Ordering::Less => {
                    if let Some(record) = self.previous_head.take() {
                        return Ok(Some(DiffRecord {
                            record,
                            kind: DiffKind::Deleted,
                        }));
                    }
                }
                Ordering::Greater => {
                    if let Some(record) = self.current_head.take() {
                        return Ok(Some(DiffRecord {
                            record,
                            kind: DiffKind::Added,
                        }));
                    }
                }
                Ordering::Equal => {
                    let previous = self.previous_head.take();
                    let current = self.current_head.take();
                    if let (Some(previous), Some(record)) = (previous, current) {
                        if !previous.same_content(&record) {
                            return Ok(Some(DiffRecord {
                                record,
                                kind: DiffKind::Changed,
                            }));
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for DiffIterator {
    type Item = ImportResult<DiffRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// The stream handed to an import backend.
#[derive(Debug)]
pub enum ImportStream {
    /// A full inventory listing.
    Inventory(InventoryIterator),
    /// Differences against a previous inventory.
    Diff(DiffIterator),
}

impl ImportStream {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inventory(_) => "inventory",
            Self::Diff(_) => "diff",
        }
    }
}
