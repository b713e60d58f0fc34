//! The catalog contract consumed by the Inlet import pipeline.
//!
//! The catalog owns meta-ranges, commits, and branches. The import pipeline
//! only ever reaches them through the narrow [`EntryCataloger`] capability
//! set, so any storage backend can be substituted.
//!
//! # Modules
//!
//! - [`error`] — [`CatalogError`] and the distinguished not-found kinds
//! - [`context`] — [`OpContext`], the cancellation context threaded through every call
//! - [`traits`] — The [`EntryCataloger`] trait and its stream types
//! - [`names`] — Branch name validation
//! - [`memory`] — [`InMemoryCatalog`], a complete backend for tests and embedding

pub mod context;
pub mod error;
pub mod memory;
pub mod names;
pub mod traits;

pub use context::OpContext;
pub use error::{CatalogError, CatalogResult};
pub use memory::InMemoryCatalog;
pub use names::validate_branch_name;
pub use traits::{CommitRequest, EntryCataloger, EntryIterator, EntryListing, EntryListingIterator};
