//! Error types for the import pipeline.

use std::fmt;

use inlet_catalog::CatalogError;
use thiserror::Error;

use crate::actions::ImportPhase;

/// The catalog call during which a collaborator error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogPhase {
    GetBranch,
    CreateBranch,
    ListEntries,
    WriteMetaRange,
    CommitMetaRange,
    UpdateBranch,
}

impl fmt::Display for CatalogPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetBranch => write!(f, "getting branch"),
            Self::CreateBranch => write!(f, "creating branch"),
            Self::ListEntries => write!(f, "listing entries"),
            Self::WriteMetaRange => write!(f, "writing meta-range"),
            Self::CommitMetaRange => write!(f, "committing meta-range"),
            Self::UpdateBranch => write!(f, "updating branch"),
        }
    }
}

/// Errors surfaced by an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import stream is not a kind this backend accepts.
    #[error("catalog import can only accept an inventory stream")]
    WrongIterator,

    /// `commit` was called before a meta-range was built in this run.
    #[error("nothing to commit - meta-range wasn't created")]
    NoMetaRange,

    /// An operation was invoked in a phase that does not allow it.
    #[error("cannot {operation} in phase {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: ImportPhase,
    },

    /// An import record could not be mapped to a catalog entry.
    #[error("converting record {key:?}: {reason}")]
    Conversion { key: String, reason: String },

    /// The inventory source failed to produce a record.
    #[error("reading inventory: {0}")]
    Inventory(String),

    /// An entry stream was not strictly increasing in path order.
    #[error("entry stream out of order: {previous:?} followed by {next:?}")]
    OutOfOrder { previous: String, next: String },

    /// The base listing contained a grouped common prefix.
    #[error("unexpected common prefix {0:?} in entry listing")]
    UnexpectedCommonPrefix(String),

    /// A catalog call failed.
    #[error("{phase}: {source}")]
    Catalog {
        phase: CatalogPhase,
        #[source]
        source: CatalogError,
    },

    #[error("invalid import config: {0}")]
    Config(String),
}

impl ImportError {
    pub fn catalog(phase: CatalogPhase) -> impl FnOnce(CatalogError) -> Self {
        move |source| Self::Catalog { phase, source }
    }

    /// The catalog call a collaborator error came from, if any.
    pub fn phase(&self) -> Option<CatalogPhase> {
        match self {
            Self::Catalog { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether re-running the import may succeed.
    ///
    /// Sequencing, conversion, and ordering errors need a fix from the caller;
    /// collaborator errors other than cancellation may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog { source, .. } => !matches!(source, CatalogError::Cancelled),
            Self::Inventory(_) => true,
            _ => false,
        }
    }
}

/// Convenience type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
