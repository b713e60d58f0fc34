//! Commit records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{CommitId, MetaRangeId};

/// Free-form string metadata attached to entries and commits.
///
/// A `BTreeMap` so that encodings (and therefore content-derived ids) are
/// deterministic.
pub type Metadata = BTreeMap<String, String>;

/// An immutable commit: a meta-range plus its place in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Parent commits, oldest first. Empty only for a repository's root commit.
    pub parents: Vec<CommitId>,
    /// The entry set this commit points to.
    pub meta_range_id: MetaRangeId,
    /// Identity of whoever created the commit.
    pub committer: String,
    pub message: String,
    pub metadata: Metadata,
    pub creation_date: DateTime<Utc>,
}

/// Summary of a previous import commit, as handed to diff-based backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLog {
    pub id: CommitId,
    pub committer: String,
    pub message: String,
    pub metadata: Metadata,
}
