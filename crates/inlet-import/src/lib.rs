//! Bulk inventory import for Inlet.
//!
//! An import takes a key-sorted inventory of objects (for example, an S3
//! inventory report) and publishes it as a single commit on a dedicated
//! import branch. Only the configured prefixes are replaced: entries under a
//! prefix that are missing from the inventory are deleted, and entries outside
//! every prefix are kept as they are.
//!
//! # Architecture
//!
//! The pipeline is a chain of lazy iterators feeding one catalog call:
//!
//! ```text
//! InventoryIterator ─▶ EntryConverter ─┐
//!                                      ├─▶ PrefixMergeIterator ─▶ write_meta_range
//! list_entries(parent) ────────────────┘
//! ```
//!
//! [`CatalogRepoActions`] sequences the run: resolve the base commit, build
//! the meta-range, commit it, and move the branch. Nothing is visible on the
//! branch until the final update.
//!
//! # Modules
//!
//! - [`actions`] — [`RepoActions`] and the catalog-backed orchestrator
//! - [`inventory`] — Import records and the input stream kinds
//! - [`convert`] — Record to entry conversion with progress counting
//! - [`prefix`] — [`PrefixSet`], the subtrees an import replaces
//! - [`merge`] — [`PrefixMergeIterator`], the streaming prefix merge
//! - [`progress`] — Concurrently readable progress counters
//! - [`config`] — [`ImportConfig`] and per-call options
//! - [`stats`] — [`ImportStats`]
//! - [`error`] — [`ImportError`]

pub mod actions;
pub mod config;
pub mod convert;
pub mod error;
pub mod inventory;
pub mod merge;
pub mod prefix;
pub mod progress;
pub mod stats;

#[cfg(test)]
mod testing;

pub use actions::{CatalogRepoActions, ImportPhase, RepoActions};
pub use config::{ApplyOptions, ImportConfig, DEFAULT_IMPORT_BRANCH, DEFAULT_SOURCE_REF};
pub use convert::{convert_record, EntryConverter};
pub use error::{CatalogPhase, ImportError, ImportResult};
pub use inventory::{DiffIterator, DiffKind, DiffRecord, ImportRecord, ImportStream, InventoryIterator};
pub use merge::{listing_entries, MergeStats, PrefixMergeIterator};
pub use prefix::PrefixSet;
pub use progress::{Progress, ProgressSnapshot};
pub use stats::ImportStats;
