//! The [`EntryCataloger`] trait: everything the import pipeline needs from a
//! catalog backend, and nothing more.

use inlet_types::{
    Branch, BranchId, CommitId, EntryRecord, MetaRangeId, Metadata, Path, Ref, RepositoryId,
};

use crate::context::OpContext;
use crate::error::CatalogResult;

/// One item of an entry listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryListing {
    /// A single entry.
    Entry(EntryRecord),
    /// A group of entries sharing a path up to and including the listing's
    /// delimiter. Only produced when a delimiter is requested.
    CommonPrefix(Path),
}

/// Lazy, single-pass listing of the entries at a ref, in path order.
pub type EntryListingIterator<'a> = Box<dyn Iterator<Item = CatalogResult<EntryListing>> + Send + 'a>;

/// Lazy, single-pass stream of entries handed to [`EntryCataloger::write_meta_range`].
pub type EntryIterator<'a> = Box<dyn Iterator<Item = CatalogResult<EntryRecord>> + Send + 'a>;

/// Parameters of a commit over an already written meta-range.
#[derive(Clone, Debug)]
pub struct CommitRequest {
    pub parent: CommitId,
    pub meta_range_id: MetaRangeId,
    pub committer: String,
    pub message: String,
    pub metadata: Metadata,
}

impl CommitRequest {
    pub fn new(parent: CommitId, meta_range_id: MetaRangeId, committer: impl Into<String>) -> Self {
        Self {
            parent,
            meta_range_id,
            committer: committer.into(),
            message: String::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Catalog capabilities consumed by the import pipeline.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call receives
/// the caller's [`OpContext`] and must fail with
/// [`CatalogError::Cancelled`](crate::CatalogError::Cancelled) once it is
/// cancelled. `update_branch` must be atomic: a reader sees either the old or
/// the new commit, never anything in between.
pub trait EntryCataloger: Send + Sync {
    /// List the entries at `reference` whose paths start with `prefix`.
    ///
    /// With a non-empty `delimiter`, entries sharing a path component after
    /// `prefix` collapse into one [`EntryListing::CommonPrefix`].
    fn list_entries(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        reference: &Ref,
        prefix: &str,
        delimiter: &str,
    ) -> CatalogResult<EntryListingIterator<'_>>;

    /// Materialize a path-sorted entry stream into an immutable meta-range.
    ///
    /// The stream is pulled one item at a time; the first error it yields
    /// aborts the write and is returned.
    fn write_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        entries: EntryIterator<'_>,
    ) -> CatalogResult<MetaRangeId>;

    /// Create a commit pointing at an existing meta-range. Does not move any
    /// branch.
    fn commit_existing_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        request: CommitRequest,
    ) -> CatalogResult<CommitId>;

    /// Read a branch. A missing branch is
    /// [`CatalogError::BranchNotFound`](crate::CatalogError::BranchNotFound).
    fn get_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
    ) -> CatalogResult<Branch>;

    /// Create a branch pointing at the commit `start` resolves to.
    fn create_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        start: &Ref,
    ) -> CatalogResult<Branch>;

    /// Repoint an existing branch at the commit `target` resolves to.
    fn update_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        target: &Ref,
    ) -> CatalogResult<Branch>;
}
