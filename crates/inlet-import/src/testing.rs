//! Shared fixtures for the crate's unit tests.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use inlet_catalog::{
    CatalogError, CatalogResult, CommitRequest, EntryCataloger, EntryIterator,
    EntryListingIterator, InMemoryCatalog, OpContext,
};
use inlet_types::{
    Branch, BranchId, CommitId, Entry, EntryRecord, Metadata, MetaRangeId, Path, Ref,
    RepositoryId,
};

use crate::inventory::ImportRecord;

pub fn entry(path: &str, etag: &str) -> EntryRecord {
    EntryRecord::new(
        Path::new(path).unwrap(),
        Entry {
            address: format!("s3://bucket/{path}"),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            size: 1,
            etag: etag.to_string(),
            metadata: Metadata::new(),
            content_type: None,
        },
    )
}

pub fn record(key: &str, checksum: &str) -> ImportRecord {
    ImportRecord::new("bucket", key, 1, checksum)
}

/// Failures a [`RecordingCatalog`] can be told to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// `get_branch` fails with a backend error.
    GetBranch,
    /// The next `get_branch` reports the branch missing even if it exists.
    HideBranchOnce,
    /// `write_meta_range` pulls this many entries, then fails.
    WriteAfter(usize),
    Commit,
    UpdateBranch,
}

/// Wraps an [`InMemoryCatalog`], recording every call and injecting faults.
pub struct RecordingCatalog {
    inner: InMemoryCatalog,
    calls: Mutex<Vec<&'static str>>,
    faults: Mutex<Vec<Fault>>,
}

impl RecordingCatalog {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &InMemoryCatalog {
        &self.inner
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inject(&self, fault: Fault) {
        self.faults.lock().unwrap().push(fault);
    }

    /// Commit `entries` on `main`, bypassing call recording.
    pub fn seed_main(&self, repository: &RepositoryId, entries: Vec<EntryRecord>) -> CommitId {
        let ctx = OpContext::new();
        let main = BranchId::new("main");
        let parent = self.inner.get_branch(&ctx, repository, &main).unwrap();
        let stream: EntryIterator<'_> = Box::new(entries.into_iter().map(Ok));
        let range = self.inner.write_meta_range(&ctx, repository, stream).unwrap();
        let commit = self
            .inner
            .commit_existing_meta_range(
                &ctx,
                repository,
                CommitRequest::new(parent.commit_id, range, "seeder").with_message("seed"),
            )
            .unwrap();
        self.inner
            .update_branch(&ctx, repository, &main, &Ref::from(commit))
            .unwrap();
        commit
    }

    fn record_call(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.faults.lock().unwrap().contains(&fault)
    }

    fn take_fault(&self, fault: Fault) -> bool {
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|f| *f == fault) {
            Some(idx) => {
                faults.remove(idx);
                true
            }
            None => false,
        }
    }

    fn write_limit(&self) -> Option<usize> {
        self.faults.lock().unwrap().iter().find_map(|f| match f {
            Fault::WriteAfter(n) => Some(*n),
            _ => None,
        })
    }
}

impl EntryCataloger for RecordingCatalog {
    fn list_entries(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        reference: &Ref,
        prefix: &str,
        delimiter: &str,
    ) -> CatalogResult<EntryListingIterator<'_>> {
        self.record_call("list_entries");
        self.inner
            .list_entries(ctx, repository, reference, prefix, delimiter)
    }

    fn write_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        entries: EntryIterator<'_>,
    ) -> CatalogResult<MetaRangeId> {
        self.record_call("write_meta_range");
        if let Some(limit) = self.write_limit() {
            for item in entries.take(limit) {
                item?;
            }
            return Err(CatalogError::Internal("disk full".into()));
        }
        self.inner.write_meta_range(ctx, repository, entries)
    }

    fn commit_existing_meta_range(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        request: CommitRequest,
    ) -> CatalogResult<CommitId> {
        self.record_call("commit_existing_meta_range");
        if self.has_fault(Fault::Commit) {
            return Err(CatalogError::Internal("commit rejected".into()));
        }
        self.inner.commit_existing_meta_range(ctx, repository, request)
    }

    fn get_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
    ) -> CatalogResult<Branch> {
        self.record_call("get_branch");
        if self.has_fault(Fault::GetBranch) {
            return Err(CatalogError::Internal("backend unavailable".into()));
        }
        if self.take_fault(Fault::HideBranchOnce) {
            return Err(CatalogError::BranchNotFound(branch.clone()));
        }
        self.inner.get_branch(ctx, repository, branch)
    }

    fn create_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        start: &Ref,
    ) -> CatalogResult<Branch> {
        self.record_call("create_branch");
        self.inner.create_branch(ctx, repository, branch, start)
    }

    fn update_branch(
        &self,
        ctx: &OpContext,
        repository: &RepositoryId,
        branch: &BranchId,
        target: &Ref,
    ) -> CatalogResult<Branch> {
        self.record_call("update_branch");
        if self.has_fault(Fault::UpdateBranch) {
            return Err(CatalogError::Internal("ref store unavailable".into()));
        }
        self.inner.update_branch(ctx, repository, branch, target)
    }
}
