//! Conversion from inventory records to catalog entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use inlet_types::{Entry, EntryRecord, Path};

use crate::error::{ImportError, ImportResult};
use crate::inventory::ImportRecord;
use crate::progress::Progress;

/// Map one inventory record onto the catalog's entry shape.
///
/// Fails with [`ImportError::Conversion`] on an empty key, a negative size,
/// a missing checksum, or when neither a physical address nor a bucket is
/// available to locate the object.
pub fn convert_record(record: ImportRecord) -> ImportResult<EntryRecord> {
    let malformed = |reason: &str| ImportError::Conversion {
        key: record.key.clone(),
        reason: reason.to_string(),
    };

    let path = Path::new(record.path()).map_err(|_| malformed("empty key"))?;
    let size = u64::try_from(record.size).map_err(|_| malformed("negative size"))?;
    if record.checksum.is_empty() {
        return Err(malformed("missing checksum"));
    }
    let address = match record.physical_address.as_deref() {
        Some(address) if !address.is_empty() => address.to_string(),
        _ if !record.bucket.is_empty() => format!("s3://{}/{}", record.bucket, record.key),
        _ => return Err(malformed("missing physical address and bucket")),
    };

    Ok(EntryRecord::new(
        path,
        Entry {
            address,
            last_modified: record.last_modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            size,
            etag: record.checksum,
            metadata: record.metadata,
            content_type: record.content_type,
        },
    ))
}

/// Lazily converts a record stream into an entry stream, counting each
/// produced entry on a shared [`Progress`].
///
/// The first failure (from the source or from conversion) is yielded once
/// and ends the stream; nothing after it is pulled.
pub struct EntryConverter<I> {
    records: I,
    progress: Arc<Progress>,
    done: bool,
}

impl<I> EntryConverter<I>
where
    I: Iterator<Item = ImportResult<ImportRecord>>,
{
    pub fn new(records: I, progress: Arc<Progress>) -> Self {
        Self {
            records,
            progress,
            done: false,
        }
    }
}

impl<I> Iterator for EntryConverter<I>
where
    I: Iterator<Item = ImportResult<ImportRecord>>,
{
    type Item = ImportResult<EntryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let converted = match self.records.next()? {
            Ok(record) => convert_record(record),
            Err(e) => Err(e),
        };
        match converted {
            Ok(entry) => {
                self.progress.increment();
                Some(Ok(entry))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
