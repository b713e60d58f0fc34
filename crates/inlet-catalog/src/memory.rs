//! In-memory catalog for tests and embedding.
//!
//! [`InMemoryCatalog`] keeps every repository in a `HashMap` behind a
//! `RwLock`. Meta-ranges are content-addressed by a BLAKE3 digest over their
//! entries and shared as `Arc<Vec<_>>`, so listings never hold the lock while
//! they are being consumed. Data is lost when the catalog is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use inlet_types::{
    Branch, BranchId, Commit, CommitId, EntryRecord, MetaRangeId, Metadata, Path, Ref,
    RepositoryId,
};
use tracing::debug;

use crate::context::OpContext;
use crate::error::{CatalogError, CatalogResult};
use crate::names::validate_branch_name;
use crate::traits::{
    CommitRequest, EntryCataloger, EntryIterator, EntryListing, EntryListingIterator,
};

type MetaRange = Arc<Vec<EntryRecord>>;

struct RepositoryState {
    branches: BTreeMap<BranchId, CommitId>,
    commits: HashMap<CommitId, Commit>,
    meta_ranges: HashMap<MetaRangeId, MetaRange>,
}

impl RepositoryState {
    /// Resolve a ref: branch names first, then commit ids.
    fn resolve(&self, reference: &Ref) -> CatalogResult<CommitId> {
        if let Some(commit) = self.branches.get(&BranchId::new(reference.as_str())) {
            return Ok(*commit);
        }
        match CommitId::from_hex(reference.as_str()) {
            Ok(id) if self.commits.contains_key(&id) => Ok(id),
            _ => Err(CatalogError::RefNotFound(reference.clone())),
        }
    }

    fn meta_range_at(&self, reference: &Ref) -> CatalogResult<MetaRange> {
        let commit_id = self.resolve(reference)?;
        let commit = self
            .commits
            .get(&commit_id)
            .ok_or(CatalogError::CommitNotFound(commit_id))?;
        self.meta_ranges
            .get(&commit.meta_range_id)
            .cloned()
            .ok_or(CatalogError::MetaRangeNotFound(commit.meta_range_id))
    }

    fn insert_commit(&mut self, commit: Commit) -> CatalogResult<CommitId> {
        let encoded = bincode::serialize(&commit)
            .map_err(|e| CatalogError::Internal(format!("encoding commit: {e}")))?;
        let id = CommitId::from_bytes(&encoded);
        self.commits.entry(id).or_insert(commit);
        Ok(id)
    }
}

/// An in-memory implementation of [`EntryCataloger`].
pub struct InMemoryCatalog {
    repositories: RwLock<HashMap<RepositoryId, RepositoryState>>,
}

impl InMemoryCatalog {
    /// Create a catalog with no repositories.
    pub fn new() -> Self {
        Self {
            repositories: RwLock::new(HashMap::new()),
        }
    }

    fn read_state(&self) -> CatalogResult<RwLockReadGuard<'_, HashMap<RepositoryId, RepositoryState>>> {
        self.repositories
            .read()
            .map_err(|e| CatalogError::Internal(format!("lock poisoned: {e}")))
    }

    fn write_state(
        &self,
    ) -> CatalogResult<RwLockWriteGuard<'_, HashMap<RepositoryId, RepositoryState>>> {
        self.repositories
            .write()
            .map_err(|e| CatalogError::Internal(format!("lock poisoned: {e}")))
    }

    /// Create a repository whose `default_branch` points at a root commit
    /// over an empty meta-range.
    pub fn create_repository(
        &self,
        repository: &RepositoryId,
        default_branch: &BranchId,
    ) -> CatalogResult<Branch> {
        validate_branch_name(default_branch.as_str())?;

        let mut repos = self.write_state()?;
        if repos.contains_key(repository) {
            return Err(CatalogError::RepositoryAlreadyExists(repository.clone()));
        }

        let empty_range = MetaRangeId::from(blake3::Hasher::new().finalize());
        let mut state = RepositoryState {
            branches: BTreeMap::new(),
            commits: HashMap::new(),
            meta_ranges: HashMap::from([(empty_range, Arc::new(Vec::new()))]),
        };
        let root = state.insert_commit(Commit {
            parents: Vec::new(),
            meta_range_id: empty_range,
            committer: String::new(),
            message: "Repository created".into(),
            metadata: Metadata::new(),
            creation_date: Utc::now(),
        })?;
        state.branches.insert(default_branch.clone(), root);
        repos.insert(repository.clone(), state);

        debug!(repository = %repository, branch = %default_branch, commit = %root.short_hex(), "created repository");
        Ok(Branch {
            id: default_branch.clone(),
            commit_id: root,
        })
    }

    /// All entries at `reference`, collected. Intended for tests.
    pub fn entries_at(
        &self,
        repository: &RepositoryId,
        reference: &Ref,
    ) -> CatalogResult<Vec<EntryRecord>> {
        let repos = self.read_state()?;
        let repo = repos
            .get(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        Ok(repo.meta_range_at(reference)?.as_ref().clone())
    }

    pub fn get_commit(&self, repository: &RepositoryId, id: &CommitId) -> CatalogResult<Commit> {
        let repos = self.read_state()?;
        let repo = repos
            .get(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        repo.commits
            .get(id)
            .cloned()
            .ok_or(CatalogError::CommitNotFound(*id))
    }

    /// Number of commits in the repository, including the root commit.
    pub fn commit_count(&self, repository: &RepositoryId) -> CatalogResult<usize> {
        let repos = self.read_state()?;
        repos
            .get(repository)
            .map(|repo| repo.commits.len())
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.repositories.read().map(|r| r.len()).unwrap_or_default();
        f.debug_struct("InMemoryCatalog")
            .field("repository_count", &count)
            .finish()
    }
}

/// Walks a shared meta-range without holding the catalog lock.
struct Listing {
    ctx: OpContext,
    entries: MetaRange,
    pos: usize,
    prefix: String,
    delimiter: String,
    done: bool,
}

impl Iterator for Listing {
    type Item = CatalogResult<EntryListing>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.ctx.check() {
            self.done = true;
            return Some(Err(e));
        }

        let record = self.entries.get(self.pos)?;
        if !record.path.has_prefix(&self.prefix) {
            self.done = true;
            return None;
        }

        let rest = &record.path.as_str()[self.prefix.len()..];
        let common = if self.delimiter.is_empty() {
            None
        } else {
            rest.find(&self.delimiter)
                .map(|idx| &record.path.as_str()[..self.prefix.len() + idx + self.delimiter.len()])
        };

        match common {
            None => {
                self.pos += 1;
                Some(Ok(EntryListing::Entry(record.clone())))
            }
            Some(common) => {
                let common = common.to_string();
                while self
                    .entries
                    .get(self.pos)
                    .is_some_and(|r| r.path.has_prefix(&common))
                {
                    self.pos += 1;
                }
                Some(
                    Path::new(common)
                        .map(EntryListing::CommonPrefix)
                        .map_err(|e| CatalogError::Internal(e.to_string())),
                )
            }
        }
    }
}

impl EntryCataloger for InMemoryCatalog {
    fn list_entries(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        reference: &Ref,
        prefix: &str,
        delimiter: &str,
    ) -> CatalogResult<EntryListingIterator<'_>> {
        ctx.check()?;
        let repos = self.read_state()?;
        let repo = repos
            .get(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        let entries = repo.meta_range_at(reference)?;
        let pos = entries.partition_point(|r| r.path.as_str() < prefix);

        Ok(Box::new(Listing {
            ctx: ctx.clone(),
            entries,
            pos,
            prefix: prefix.to_string(),
            delimiter: delimiter.to_string(),
            done: false,
        }))
    }

    fn write_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        entries: EntryIterator<'_>,
    ) -> CatalogResult<MetaRangeId> {
        ctx.check()?;
        if !self.read_state()?.contains_key(repository) {
            return Err(CatalogError::RepositoryNotFound(repository.clone()));
        }

        // Pull the whole stream before taking the write lock: the stream may
        // itself be reading from this catalog.
        let mut hasher = blake3::Hasher::new();
        let mut records: Vec<EntryRecord> = Vec::new();
        for item in entries {
            ctx.check()?;
            let record = item?;
            if let Some(previous) = records.last() {
                if previous.path >= record.path {
                    return Err(CatalogError::UnsortedEntries {
                        previous: previous.path.clone(),
                        next: record.path,
                    });
                }
            }
            let encoded = bincode::serialize(&record)
                .map_err(|e| CatalogError::Internal(format!("encoding entry: {e}")))?;
            hasher.update(&(encoded.len() as u64).to_le_bytes());
            hasher.update(&encoded);
            records.push(record);
        }
        let id = MetaRangeId::from(hasher.finalize());

        let mut repos = self.write_state()?;
        let repo = repos
            .get_mut(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        repo.meta_ranges
            .entry(id)
            .or_insert_with(|| Arc::new(records));

        debug!(repository = %repository, meta_range = %id.short_hex(), "wrote meta-range");
        Ok(id)
    }

    fn commit_existing_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        request: CommitRequest,
    ) -> CatalogResult<CommitId> {
        ctx.check()?;
        let mut repos = self.write_state()?;
        let repo = repos
            .get_mut(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        if !repo.commits.contains_key(&request.parent) {
            return Err(CatalogError::CommitNotFound(request.parent));
        }
        if !repo.meta_ranges.contains_key(&request.meta_range_id) {
            return Err(CatalogError::MetaRangeNotFound(request.meta_range_id));
        }

        let id = repo.insert_commit(Commit {
            parents: vec![request.parent],
            meta_range_id: request.meta_range_id,
            committer: request.committer,
            message: request.message,
            metadata: request.metadata,
            creation_date: Utc::now(),
        })?;

        debug!(repository = %repository, commit = %id.short_hex(), parent = %request.parent.short_hex(), "created commit");
        Ok(id)
    }

    fn get_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
    ) -> CatalogResult<Branch> {
        ctx.check()?;
        let repos = self.read_state()?;
        let repo = repos
            .get(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        repo.branches
            .get(branch)
            .map(|commit_id| Branch {
                id: branch.clone(),
                commit_id: *commit_id,
            })
            .ok_or_else(|| CatalogError::BranchNotFound(branch.clone()))
    }

    fn create_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        start: &Ref,
    ) -> CatalogResult<Branch> {
        ctx.check()?;
        validate_branch_name(branch.as_str())?;

        let mut repos = self.write_state()?;
        let repo = repos
            .get_mut(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        if repo.branches.contains_key(branch) {
            return Err(CatalogError::BranchAlreadyExists(branch.clone()));
        }
        let commit_id = repo.resolve(start)?;
        repo.branches.insert(branch.clone(), commit_id);

        debug!(repository = %repository, branch = %branch, start = %start, "created branch");
        Ok(Branch {
            id: branch.clone(),
            commit_id,
        })
    }

    fn update_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        target: &Ref,
    ) -> CatalogResult<Branch> {
        ctx.check()?;
        let mut repos = self.write_state()?;
        let repo = repos
            .get_mut(repository)
            .ok_or_else(|| CatalogError::RepositoryNotFound(repository.clone()))?;
        if !repo.branches.contains_key(branch) {
            return Err(CatalogError::BranchNotFound(branch.clone()));
        }
        let commit_id = repo.resolve(target)?;
        repo.branches.insert(branch.clone(), commit_id);

        debug!(repository = %repository, branch = %branch, commit = %commit_id.short_hex(), "updated branch");
        Ok(Branch {
            id: branch.clone(),
            commit_id,
        })
    }
}
