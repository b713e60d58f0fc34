//! Prefix-scoped streaming merge of imported entries over an existing tree.
//!
//! [`PrefixMergeIterator`] combines two path-sorted entry streams:
//!
//! - the **replacement** stream (converted import records), emitted verbatim;
//! - the **base** stream (entries already on the branch), from which every
//!   entry under a configured prefix is dropped.
//!
//! Dropping covered base entries is what expresses deletions: an object that
//! disappeared from the inventory simply has no replacement entry, so nothing
//! is emitted for it. When both streams carry the same path the replacement
//! entry wins. The merge holds one head per stream and never buffers.

use std::cmp::Ordering;
use std::iter::Fuse;

use inlet_catalog::{EntryListing, EntryListingIterator};
use inlet_types::{EntryRecord, Path};

use crate::error::{CatalogPhase, ImportError, ImportResult};
use crate::prefix::PrefixSet;

/// Adapt a catalog listing (requested without a delimiter) into a base
/// stream for [`PrefixMergeIterator`].
pub fn listing_entries<'a>(
    listing: EntryListingIterator<'a>,
) -> impl Iterator<Item = ImportResult<EntryRecord>> + Send + 'a {
    listing.map(|item| match item {
        Ok(EntryListing::Entry(record)) => Ok(record),
        Ok(EntryListing::CommonPrefix(path)) => {
            Err(ImportError::UnexpectedCommonPrefix(path.to_string()))
        }
        Err(source) => Err(ImportError::Catalog {
            phase: CatalogPhase::ListEntries,
            source,
        }),
    })
}

/// Counts of what a merge did with its inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Replacement entries emitted.
    pub imported: u64,
    /// Base entries outside every prefix, passed through.
    pub kept: u64,
    /// Base entries dropped: under a prefix, or superseded by a replacement
    /// entry at the same path.
    pub dropped: u64,
}

/// Merges a replacement stream over a base stream, scoped by a [`PrefixSet`].
///
/// The output is strictly increasing in path order. An input that breaks the
/// order surfaces as [`ImportError::OutOfOrder`]. The first error from either
/// input is yielded once and ends the stream.
pub struct PrefixMergeIterator<R, B>
where
    R: Iterator<Item = ImportResult<EntryRecord>>,
    B: Iterator<Item = ImportResult<EntryRecord>>,
{
    replacement: Fuse<R>,
    base: Fuse<B>,
    prefixes: PrefixSet,
    replacement_head: Option<EntryRecord>,
    base_head: Option<EntryRecord>,
    last: Option<Path>,
    stats: MergeStats,
    done: bool,
}

impl<R, B> PrefixMergeIterator<R, B>
where
    R: Iterator<Item = ImportResult<EntryRecord>>,
    B: Iterator<Item = ImportResult<EntryRecord>>,
{
    pub fn new(replacement: R, base: B, prefixes: PrefixSet) -> Self {
        Self {
            replacement: replacement.fuse(),
            base: base.fuse(),
            prefixes,
            replacement_head: None,
            base_head: None,
            last: None,
            stats: MergeStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    fn step(&mut self) -> ImportResult<Option<EntryRecord>> {
        if self.replacement_head.is_none() {
            self.replacement_head = self.replacement.next().transpose()?;
        }
        while self.base_head.is_none() {
            match self.base.next().transpose()? {
                None => break,
                Some(record) if self.prefixes.covers(record.path.as_str()) => {
                    self.stats.dropped += 1;
                }
                Some(record) => self.base_head = Some(record),
            }
        }

        let next = match (self.replacement_head.take(), self.base_head.take()) {
            (None, None) => return Ok(None),
            (Some(replacement), None) => {
                self.stats.imported += 1;
                replacement
            }
            (None, Some(base)) => {
                self.stats.kept += 1;
                base
            }
            (Some(replacement), Some(base)) => match replacement.path.cmp(&base.path) {
                Ordering::Less => {
                    self.base_head = Some(base);
                    self.stats.imported += 1;
                    replacement
                }
                Ordering::Greater => {
                    self.replacement_head = Some(replacement);
                    self.stats.kept += 1;
                    base
                }
                Ordering::Equal => {
                    self.stats.dropped += 1;
                    self.stats.imported += 1;
                    replacement
                }
            },
        };

        if let Some(previous) = &self.last {
            if *previous >= next.path {
                return Err(ImportError::OutOfOrder {
                    previous: previous.to_string(),
                    next: next.path.to_string(),
                });
            }
        }
        self.last = Some(next.path.clone());
        Ok(Some(next))
    }
}

impl<R, B> Iterator for PrefixMergeIterator<R, B>
where
    R: Iterator<Item = ImportResult<EntryRecord>>,
    B: Iterator<Item = ImportResult<EntryRecord>>,
{
    type Item = ImportResult<EntryRecord>;

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
