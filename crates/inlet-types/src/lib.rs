//! Foundation types for Inlet.
//!
//! Inlet imports bulk object inventories into a versioned, git-like object
//! catalog. This crate holds the vocabulary shared by the catalog contract
//! and the import pipeline. Every other Inlet crate depends on `inlet-types`.
//!
//! # Key Types
//!
//! - [`Path`] — Catalog path, ordered byte-lexicographically
//! - [`Entry`] / [`EntryRecord`] — Object descriptor and its path-keyed record
//! - [`MetaRangeId`] — Content-derived id of an immutable entry set
//! - [`CommitId`] — Content-derived id of a commit
//! - [`RepositoryId`], [`BranchId`], [`Ref`] — Catalog addressing
//! - [`Branch`], [`Commit`], [`CommitLog`] — Catalog history records

pub mod commit;
pub mod entry;
pub mod error;
pub mod id;
pub mod refs;

pub use commit::{Commit, CommitLog, Metadata};
pub use entry::{Entry, EntryRecord, Path};
pub use error::TypeError;
pub use id::{CommitId, MetaRangeId};
pub use refs::{Branch, BranchId, Ref, RepositoryId};
