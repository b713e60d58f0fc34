//! Error types for catalog operations.

use inlet_types::{BranchId, CommitId, MetaRangeId, Path, Ref, RepositoryId};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("repository not found: {0}")]
    RepositoryNotFound(RepositoryId),

    #[error("repository already exists: {0}")]
    RepositoryAlreadyExists(RepositoryId),

    /// The branch does not exist. Callers bootstrapping a branch expect this.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    #[error("branch already exists: {0}")]
    BranchAlreadyExists(BranchId),

    /// The ref is neither a branch nor a known commit id.
    #[error("ref not found: {0}")]
    RefNotFound(Ref),

    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    #[error("meta-range not found: {0}")]
    MetaRangeNotFound(MetaRangeId),

    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// Entries handed to a meta-range write were not strictly increasing.
    #[error("entries out of order: {previous} followed by {next}")]
    UnsortedEntries { previous: Path, next: Path },

    /// The operation context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The entry stream being written failed while it was pulled.
    #[error("entry source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Wrap an error raised by an entry stream.
    pub fn from_source(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Source(err.into())
    }

    /// Returns `true` for every "does not exist" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RepositoryNotFound(_)
                | Self::BranchNotFound(_)
                | Self::RefNotFound(_)
                | Self::CommitNotFound(_)
                | Self::MetaRangeNotFound(_)
        )
    }

    pub fn is_branch_not_found(&self) -> bool {
        matches!(self, Self::BranchNotFound(_))
    }
}

/// Convenience type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
