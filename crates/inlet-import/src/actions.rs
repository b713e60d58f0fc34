//! The import orchestrator.
//!
//! An import run moves through three phases against the catalog:
//!
//! 1. **Resolve base** — read the import branch, creating it from the
//!    configured source ref on first import. Its commit becomes the parent.
//! 2. **Build range** — merge the converted inventory over the entries at the
//!    parent commit and have the catalog materialize a meta-range.
//! 3. **Commit** — commit the meta-range on top of the parent, then repoint
//!    the branch.
//!
//! Only the final branch update is visible to other readers, so a run that
//! fails anywhere before it leaves the branch untouched and can simply be run
//! again. A commit whose branch update fails is left orphaned and the error
//! is surfaced.

use std::fmt;
use std::sync::Arc;

use inlet_catalog::{
    CatalogError, CommitRequest, EntryCataloger, EntryIterator, OpContext,
};
use inlet_types::{Branch, CommitId, CommitLog, MetaRangeId, Metadata, Ref};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ApplyOptions, ImportConfig};
use crate::convert::EntryConverter;
use crate::error::{CatalogPhase, ImportError, ImportResult};
use crate::inventory::{ImportStream, InventoryIterator};
use crate::merge::{listing_entries, MergeStats, PrefixMergeIterator};
use crate::progress::Progress;
use crate::stats::ImportStats;

/// Where an import run stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportPhase {
    Init,
    BaseResolved,
    RangeBuilt,
    Committed,
    Failed,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::BaseResolved => write!(f, "base-resolved"),
            Self::RangeBuilt => write!(f, "range-built"),
            Self::Committed => write!(f, "committed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Operations an import backend exposes to the import command.
pub trait RepoActions {
    /// Build the new tree from `stream`. Returns the run's statistics.
    fn apply_import(
        &mut self,
        ctx: &OpContext,
        stream: ImportStream,
        options: ApplyOptions,
    ) -> ImportResult<ImportStats>;

    /// Resolve (or bootstrap) the import branch. Backends that diff against
    /// the previous import return its commit; others return `None`.
    fn previous_commit(&mut self, ctx: &OpContext) -> ImportResult<Option<CommitLog>>;

    /// Commit the built tree and publish it on the import branch. Returns the
    /// new commit id.
    fn commit(&mut self, ctx: &OpContext, message: &str, metadata: Metadata)
        -> ImportResult<String>;

    /// `[import progress, commit progress]`, for display while the run is in
    /// flight.
    fn progress(&self) -> [Arc<Progress>; 2];
}

/// Imports into a catalog by writing a merged meta-range and committing it.
pub struct CatalogRepoActions {
    catalog: Arc<dyn EntryCataloger>,
    config: ImportConfig,
    phase: ImportPhase,
    parent: Option<CommitId>,
    meta_range_id: Option<MetaRangeId>,
    import_progress: Arc<Progress>,
    commit_progress: Arc<Progress>,
}

impl CatalogRepoActions {
    pub fn new(catalog: Arc<dyn EntryCataloger>, config: ImportConfig) -> ImportResult<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            phase: ImportPhase::Init,
            parent: None,
            meta_range_id: None,
            import_progress: Arc::new(Progress::new("Objects imported")),
            commit_progress: Arc::new(Progress::new("Commit progress")),
        })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// The commit the import will be committed on top of, once resolved.
    pub fn parent_commit(&self) -> Option<CommitId> {
        self.parent
    }

    /// The meta-range built by this run, once built.
    pub fn meta_range_id(&self) -> Option<MetaRangeId> {
        self.meta_range_id
    }

    /// Moves the run to `Failed` if `result` is an error.
    fn record_failure<T>(&mut self, result: ImportResult<T>) -> ImportResult<T> {
        if let Err(e) = &result {
            warn!(
                repository = %self.config.repository,
                branch = %self.config.branch,
                phase = %self.phase,
                error = %e,
                "import run failed"
            );
            self.phase = ImportPhase::Failed;
        }
        result
    }

    fn resolve_base(&mut self, ctx: &OpContext) -> ImportResult<CommitId> {
        match self.phase {
            ImportPhase::Init | ImportPhase::BaseResolved => {}
            phase => {
                return Err(ImportError::InvalidPhase {
                    operation: "resolve the base commit",
                    phase,
                })
            }
        }

        let result = self.lookup_or_create_branch(ctx);
        let branch = self.record_failure(result)?;
        self.parent = Some(branch.commit_id);
        self.phase = ImportPhase::BaseResolved;

        info!(
            repository = %self.config.repository,
            branch = %branch.id,
            parent = %branch.commit_id.short_hex(),
            "resolved import base"
        );
        Ok(branch.commit_id)
    }

    fn lookup_or_create_branch(&self, ctx: &OpContext) -> ImportResult<Branch> {
        let repository = &self.config.repository;
        let branch = &self.config.branch;

        match self.catalog.get_branch(ctx, repository, branch) {
            Ok(found) => Ok(found),
            Err(e) if e.is_branch_not_found() => {
                info!(
                    repository = %repository,
                    branch = %branch,
                    source = %self.config.source_ref,
                    "first import, creating branch"
                );
                match self
                    .catalog
                    .create_branch(ctx, repository, branch, &self.config.source_ref)
                {
                    Ok(created) => Ok(created),
                    // A concurrent first import created it between our read
                    // and our create.
                    Err(CatalogError::BranchAlreadyExists(_)) => {
                        debug!(branch = %branch, "branch created concurrently, re-reading");
                        self.catalog
                            .get_branch(ctx, repository, branch)
                            .map_err(ImportError::catalog(CatalogPhase::GetBranch))
                    }
                    Err(e) => Err(ImportError::catalog(CatalogPhase::CreateBranch)(e)),
                }
            }
            Err(e) => Err(ImportError::catalog(CatalogPhase::GetBranch)(e)),
        }
    }

    fn build_range(
        &self,
        ctx: &OpContext,
        parent: CommitId,
        inventory: InventoryIterator,
        options: ApplyOptions,
    ) -> ImportResult<(Option<MetaRangeId>, MergeStats)> {
        let repository = &self.config.repository;
        let listing = self
            .catalog
            .list_entries(ctx, repository, &Ref::from(parent), "", "")
            .map_err(ImportError::catalog(CatalogPhase::ListEntries))?;

        let mut merged = PrefixMergeIterator::new(
            EntryConverter::new(inventory, Arc::clone(&self.import_progress)),
            listing_entries(listing),
            self.config.prefixes.clone(),
        );

        if options.dry_run {
            for item in merged.by_ref() {
                item?;
            }
            return Ok((None, merged.stats()));
        }

        let stream: EntryIterator<'_> =
            Box::new(merged.by_ref().map(|item| item.map_err(CatalogError::from_source)));
        let id = self
            .catalog
            .write_meta_range(ctx, repository, stream)
            .map_err(write_error)?;
        Ok((Some(id), merged.stats()))
    }

    fn commit_range(
        &mut self,
        ctx: &OpContext,
        message: &str,
        metadata: Metadata,
    ) -> ImportResult<CommitId> {
        let meta_range_id = match (self.phase, self.meta_range_id) {
            (ImportPhase::RangeBuilt, Some(id)) => id,
            (_, None) => return Err(ImportError::NoMetaRange),
            (phase, Some(_)) => {
                return Err(ImportError::InvalidPhase {
                    operation: "commit",
                    phase,
                })
            }
        };
        let Some(parent) = self.parent else {
            return Err(ImportError::NoMetaRange);
        };

        let request = CommitRequest::new(parent, meta_range_id, self.config.committer.clone())
            .with_message(message)
            .with_metadata(metadata);
        let result = self
            .catalog
            .commit_existing_meta_range(ctx, &self.config.repository, request)
            .map_err(ImportError::catalog(CatalogPhase::CommitMetaRange));
        let commit_id = self.record_failure(result)?;
        self.commit_progress.increment();

        let result = self
            .catalog
            .update_branch(
                ctx,
                &self.config.repository,
                &self.config.branch,
                &Ref::from(commit_id),
            )
            .map_err(ImportError::catalog(CatalogPhase::UpdateBranch));
        if result.is_err() {
            warn!(
                commit = %commit_id,
                branch = %self.config.branch,
                "commit created but branch was not updated"
            );
        }
        self.record_failure(result)?;
        self.commit_progress.increment();
        self.phase = ImportPhase::Committed;

        info!(
            repository = %self.config.repository,
            branch = %self.config.branch,
            commit = %commit_id.short_hex(),
            "import committed"
        );
        Ok(commit_id)
    }
}

/// Recover the pipeline's own error when the catalog aborted a write because
/// the entry stream failed.
fn write_error(err: CatalogError) -> ImportError {
    match err {
        CatalogError::Source(source) => match source.downcast::<ImportError>() {
            Ok(inner) => *inner,
            Err(other) => ImportError::Catalog {
                phase: CatalogPhase::WriteMetaRange,
                source: CatalogError::Source(other),
            },
        },
        other => ImportError::Catalog {
            phase: CatalogPhase::WriteMetaRange,
            source: other,
        },
    }
}

impl RepoActions for CatalogRepoActions {
    fn apply_import(
        &mut self,
        ctx: &OpContext,
        stream: ImportStream,
        options: ApplyOptions,
    ) -> ImportResult<ImportStats> {
        debug!(kind = stream.kind(), dry_run = options.dry_run, "start apply import");

        let ImportStream::Inventory(inventory) = stream else {
            return Err(ImportError::WrongIterator);
        };
        if !matches!(self.phase, ImportPhase::Init | ImportPhase::BaseResolved) {
            return Err(ImportError::InvalidPhase {
                operation: "apply an import",
                phase: self.phase,
            });
        }

        // Each call counts only its own entries.
        self.import_progress.activate();
        self.import_progress.reset();

        let parent = match self.parent {
            Some(parent) if self.phase == ImportPhase::BaseResolved => parent,
            _ => self.resolve_base(ctx)?,
        };

        let result = self.build_range(ctx, parent, inventory, options);
        let (meta_range_id, merge) = self.record_failure(result)?;
        self.import_progress.set_completed(true);

        info!(
            repository = %self.config.repository,
            meta_range = ?meta_range_id,
            imported = merge.imported,
            kept = merge.kept,
            dropped = merge.dropped,
            dry_run = options.dry_run,
            "import range built"
        );
        if let Some(id) = meta_range_id {
            self.meta_range_id = Some(id);
            self.phase = ImportPhase::RangeBuilt;
        }
        Ok(ImportStats::new(merge.imported))
    }

    fn previous_commit(&mut self, ctx: &OpContext) -> ImportResult<Option<CommitLog>> {
        self.resolve_base(ctx)?;
        Ok(None)
    }

    fn commit(
        &mut self,
        ctx: &OpContext,
        message: &str,
        metadata: Metadata,
    ) -> ImportResult<String> {
        self.commit_progress.activate();
        let result = self.commit_range(ctx, message, metadata);
        self.commit_progress.set_completed(true);
        result.map(|id| id.to_hex())
    }

    fn progress(&self) -> [Arc<Progress>; 2] {
        [
            Arc::clone(&self.import_progress),
            Arc::clone(&self.commit_progress),
        ]
    }
}

#[cfg(test)]
mod tests {
    use inlet_catalog::InMemoryCatalog;
    use inlet_types::{BranchId, RepositoryId};

    use super::*;
    use crate::inventory::{DiffIterator, ImportRecord};
    use crate::testing::{entry, record, Fault, RecordingCatalog};

    fn repo() -> RepositoryId {
        RepositoryId::new("datalake")
    }

    fn import_branch() -> BranchId {
        BranchId::new("import-from-inventory")
    }

    fn catalog() -> Arc<RecordingCatalog> {
        let inner = InMemoryCatalog::new();
        inner.create_repository(&repo(), &BranchId::new("main")).unwrap();
        Arc::new(RecordingCatalog::new(inner))
    }

    fn actions(catalog: &Arc<RecordingCatalog>, prefixes: &[&str]) -> CatalogRepoActions {
        let config = ImportConfig::new(repo(), "importer@example.com")
            .with_prefixes(prefixes.iter().copied());
        CatalogRepoActions::new(Arc::clone(catalog) as Arc<dyn EntryCataloger>, config).unwrap()
    }

    fn inventory(keys: &[(&str, &str)]) -> ImportStream {
        ImportStream::Inventory(InventoryIterator::from_records(
            keys.iter().map(|(k, c)| record(k, c)).collect(),
        ))
    }

    fn paths_and_tags(catalog: &RecordingCatalog, reference: Ref) -> Vec<(String, String)> {
        catalog
            .inner()
            .entries_at(&repo(), &reference)
            .unwrap()
            .into_iter()
            .map(|e| (e.path.to_string(), e.entry.etag))
            .collect()
    }

    #[test]
    fn full_run_replaces_prefix_and_publishes_commit() {
        let catalog = catalog();
        let main = catalog.seed_main(
            &repo(),
            vec![entry("a/1", "X"), entry("a/2", "Y"), entry("b/1", "Z")],
        );

        let mut run = actions(&catalog, &["a/"]);
        assert_eq!(run.previous_commit(&OpContext::new()).unwrap(), None);
        assert_eq!(run.parent_commit(), Some(main));

        let ctx = OpContext::new();
        let stats = run
            .apply_import(&ctx, inventory(&[("a/1", "X'")]), ApplyOptions::default())
            .unwrap();
        assert_eq!(stats, ImportStats::new(1));
        assert_eq!(run.phase(), ImportPhase::RangeBuilt);

        let mut metadata = Metadata::new();
        metadata.insert("source".into(), "inventory-2024-01-01".into());
        let commit_hex = run.commit(&ctx, "Import from inventory", metadata).unwrap();
        assert_eq!(run.phase(), ImportPhase::Committed);

        let commit_id = CommitId::from_hex(&commit_hex).unwrap();
        let branch = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();
        assert_eq!(branch.commit_id, commit_id);

        let commit = catalog.inner().get_commit(&repo(), &commit_id).unwrap();
        assert_eq!(commit.parents, vec![main]);
        assert_eq!(commit.committer, "importer@example.com");
        assert_eq!(commit.message, "Import from inventory");
        assert_eq!(commit.metadata.get("source").map(String::as_str), Some("inventory-2024-01-01"));
        assert_eq!(Some(commit.meta_range_id), run.meta_range_id());

        assert_eq!(
            paths_and_tags(&catalog, Ref::from(commit_id)),
            vec![("a/1".to_string(), "X'".to_string()), ("b/1".to_string(), "Z".to_string())]
        );

        let [import, commit_progress] = run.progress();
        assert_eq!(import.current(), 1);
        assert!(import.is_completed());
        assert_eq!(commit_progress.current(), 2);
        assert!(commit_progress.is_completed());
    }

    #[test]
    fn apply_from_init_resolves_base_first() {
        let catalog = catalog();
        let mut run = actions(&catalog, &[]);
        run.apply_import(&OpContext::new(), inventory(&[("k", "1")]), ApplyOptions::default())
            .unwrap();
        assert!(run.parent_commit().is_some());
        assert_eq!(
            catalog.calls(),
            vec!["get_branch", "create_branch", "list_entries", "write_meta_range"]
        );
    }

    #[test]
    fn empty_prefix_set_replaces_whole_tree() {
        let catalog = catalog();
        catalog.seed_main(&repo(), vec![entry("a/1", "X"), entry("b/1", "Z")]);
        let mut run = actions(&catalog, &[]);
        let ctx = OpContext::new();
        run.apply_import(&ctx, inventory(&[("c/1", "N")]), ApplyOptions::default())
            .unwrap();
        let commit = run.commit(&ctx, "replace all", Metadata::new()).unwrap();
        assert_eq!(
            paths_and_tags(&catalog, Ref::new(commit)),
            vec![("c/1".to_string(), "N".to_string())]
        );
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let catalog = catalog();
        let ctx = OpContext::new();

        let mut first = actions(&catalog, &[]);
        first.previous_commit(&ctx).unwrap();
        let parent = first.parent_commit();
        first.previous_commit(&ctx).unwrap();
        assert_eq!(first.parent_commit(), parent);

        let mut second = actions(&catalog, &[]);
        second.previous_commit(&ctx).unwrap();
        assert_eq!(second.parent_commit(), parent);

        let creates = catalog.calls().iter().filter(|c| **c == "create_branch").count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn bootstrap_race_reads_the_winner() {
        let catalog = catalog();
        let ctx = OpContext::new();
        catalog
            .create_branch(&ctx, &repo(), &import_branch(), &Ref::new("main"))
            .unwrap();
        catalog.inject(Fault::HideBranchOnce);

        let mut run = actions(&catalog, &[]);
        run.previous_commit(&ctx).unwrap();
        assert_eq!(run.phase(), ImportPhase::BaseResolved);
        let branch = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();
        assert_eq!(run.parent_commit(), Some(branch.commit_id));
    }

    #[test]
    fn branch_lookup_error_aborts_without_bootstrap() {
        let catalog = catalog();
        catalog.inject(Fault::GetBranch);
        let mut run = actions(&catalog, &[]);
        let err = run.previous_commit(&OpContext::new()).unwrap_err();
        assert_eq!(err.phase(), Some(CatalogPhase::GetBranch));
        assert_eq!(run.phase(), ImportPhase::Failed);
        assert_eq!(catalog.calls(), vec!["get_branch"]);
    }

    #[test]
    fn commit_before_apply_fails_without_catalog_calls() {
        let catalog = catalog();
        let mut run = actions(&catalog, &[]);
        let err = run.commit(&OpContext::new(), "msg", Metadata::new()).unwrap_err();
        assert!(matches!(err, ImportError::NoMetaRange));
        assert!(catalog.calls().is_empty());
        assert_eq!(run.phase(), ImportPhase::Init);
    }

    #[test]
    fn wrong_stream_kind_rejected_before_catalog() {
        let catalog = catalog();
        let mut run = actions(&catalog, &[]);
        let diff = ImportStream::Diff(DiffIterator::new(
            InventoryIterator::from_records(vec![]),
            InventoryIterator::from_records(vec![record("a", "1")]),
        ));
        let err = run
            .apply_import(&OpContext::new(), diff, ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::WrongIterator));
        assert!(catalog.calls().is_empty());
        assert_eq!(run.phase(), ImportPhase::Init);

        let [import, _] = run.progress();
        assert!(!import.is_active());
    }

    #[test]
    fn build_failure_keeps_partial_progress_and_branch() {
        let catalog = catalog();
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &[]);
        run.previous_commit(&ctx).unwrap();
        let before = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();

        catalog.inject(Fault::WriteAfter(3));
        let keys: Vec<(String, String)> = (0..5).map(|i| (format!("k{i}"), "c".to_string())).collect();
        let refs: Vec<(&str, &str)> = keys.iter().map(|(k, c)| (k.as_str(), c.as_str())).collect();
        let err = run
            .apply_import(&ctx, inventory(&refs), ApplyOptions::default())
            .unwrap_err();

        assert_eq!(err.phase(), Some(CatalogPhase::WriteMetaRange));
        assert!(err.to_string().contains("disk full"), "{err}");
        assert_eq!(run.phase(), ImportPhase::Failed);
        assert_eq!(run.meta_range_id(), None);

        let [import, _] = run.progress();
        assert_eq!(import.current(), 3);
        assert!(!import.is_completed());

        let after = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();
        assert_eq!(before, after);

        let err = run.commit(&ctx, "msg", Metadata::new()).unwrap_err();
        assert!(matches!(err, ImportError::NoMetaRange));
    }

    #[test]
    fn conversion_error_surfaces_unwrapped() {
        let catalog = catalog();
        let mut run = actions(&catalog, &[]);
        let stream = ImportStream::Inventory(InventoryIterator::from_records(vec![
            record("a", "1"),
            ImportRecord::new("bucket", "b", -1, "1"),
        ]));
        let err = run
            .apply_import(&OpContext::new(), stream, ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Conversion { ref key, .. } if key == "b"));
        assert!(!err.is_retryable());
        assert_eq!(run.phase(), ImportPhase::Failed);
    }

    #[test]
    fn unsorted_inventory_fails_the_build() {
        let catalog = catalog();
        let mut run = actions(&catalog, &[]);
        let err = run
            .apply_import(&OpContext::new(), inventory(&[("b", "1"), ("a", "1")]), ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::OutOfOrder { .. }));
    }

    #[test]
    fn update_failure_leaves_orphaned_commit() {
        let catalog = catalog();
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &[]);
        run.apply_import(&ctx, inventory(&[("a", "1")]), ApplyOptions::default())
            .unwrap();
        let before = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();
        let commits_before = catalog.inner().commit_count(&repo()).unwrap();

        catalog.inject(Fault::UpdateBranch);
        let err = run.commit(&ctx, "msg", Metadata::new()).unwrap_err();
        assert_eq!(err.phase(), Some(CatalogPhase::UpdateBranch));
        assert_eq!(run.phase(), ImportPhase::Failed);

        assert_eq!(catalog.inner().commit_count(&repo()).unwrap(), commits_before + 1);
        let after = catalog.get_branch(&ctx, &repo(), &import_branch()).unwrap();
        assert_eq!(before, after);

        let [_, commit_progress] = run.progress();
        assert_eq!(commit_progress.current(), 1);
        assert!(commit_progress.is_completed());

        let err = run.commit(&ctx, "again", Metadata::new()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidPhase {
                phase: ImportPhase::Failed,
                ..
            }
        ));
    }

    #[test]
    fn commit_failure_does_not_touch_branch() {
        let catalog = catalog();
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &[]);
        run.apply_import(&ctx, inventory(&[("a", "1")]), ApplyOptions::default())
            .unwrap();
        catalog.inject(Fault::Commit);
        let err = run.commit(&ctx, "msg", Metadata::new()).unwrap_err();
        assert_eq!(err.phase(), Some(CatalogPhase::CommitMetaRange));
        assert!(!catalog.calls().contains(&"update_branch"));
    }

    #[test]
    fn dry_run_counts_without_writing() {
        let catalog = catalog();
        catalog.seed_main(&repo(), vec![entry("x", "1")]);
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &["a/"]);
        let stats = run
            .apply_import(
                &ctx,
                inventory(&[("a/1", "1"), ("a/2", "1")]),
                ApplyOptions { dry_run: true },
            )
            .unwrap();
        assert_eq!(stats.added_or_changed, 2);
        assert_eq!(run.phase(), ImportPhase::BaseResolved);
        assert_eq!(run.meta_range_id(), None);
        assert!(!catalog.calls().contains(&"write_meta_range"));

        let err = run.commit(&ctx, "msg", Metadata::new()).unwrap_err();
        assert!(matches!(err, ImportError::NoMetaRange));
    }

    #[test]
    fn failed_build_after_dry_run_reports_only_its_own_progress() {
        let catalog = catalog();
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &[]);
        run.apply_import(&ctx, inventory(&[("a", "1"), ("b", "1")]), ApplyOptions { dry_run: true })
            .unwrap();
        let [import, _] = run.progress();
        assert_eq!(import.current(), 2);
        assert!(import.is_completed());

        catalog.inject(Fault::WriteAfter(1));
        let err = run
            .apply_import(&ctx, inventory(&[("a", "1"), ("b", "1")]), ApplyOptions::default())
            .unwrap_err();
        assert_eq!(err.phase(), Some(CatalogPhase::WriteMetaRange));
        assert_eq!(import.current(), 1);
        assert!(!import.is_completed());
        assert_eq!(run.phase(), ImportPhase::Failed);
    }

    #[test]
    fn cancelled_context_fails_the_run() {
        let catalog = catalog();
        let ctx = OpContext::new();
        ctx.cancel();
        let mut run = actions(&catalog, &[]);
        let err = run
            .apply_import(&ctx, inventory(&[("a", "1")]), ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Catalog {
                phase: CatalogPhase::GetBranch,
                source: CatalogError::Cancelled,
            }
        ));
        assert!(!err.is_retryable());
        assert_eq!(run.phase(), ImportPhase::Failed);
    }

    #[test]
    fn second_import_builds_on_the_first() {
        let catalog = catalog();
        let ctx = OpContext::new();

        let mut first = actions(&catalog, &[]);
        first
            .apply_import(&ctx, inventory(&[("a/1", "1"), ("b/1", "1")]), ApplyOptions::default())
            .unwrap();
        let first_commit = CommitId::from_hex(&first.commit(&ctx, "first", Metadata::new()).unwrap()).unwrap();

        let mut second = actions(&catalog, &["b/"]);
        second
            .apply_import(&ctx, inventory(&[("b/2", "2")]), ApplyOptions::default())
            .unwrap();
        assert_eq!(second.parent_commit(), Some(first_commit));
        let second_commit = second.commit(&ctx, "second", Metadata::new()).unwrap();

        assert_eq!(
            paths_and_tags(&catalog, Ref::new(second_commit)),
            vec![("a/1".to_string(), "1".to_string()), ("b/2".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn phases_are_enforced_after_commit() {
        let catalog = catalog();
        let ctx = OpContext::new();
        let mut run = actions(&catalog, &[]);
        run.apply_import(&ctx, inventory(&[("a", "1")]), ApplyOptions::default())
            .unwrap();
        run.commit(&ctx, "msg", Metadata::new()).unwrap();

        let err = run
            .apply_import(&ctx, inventory(&[("b", "1")]), ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidPhase {
                phase: ImportPhase::Committed,
                ..
            }
        ));
        assert!(run.previous_commit(&ctx).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let catalog = catalog();
        let config = ImportConfig::new(repo(), "");
        let result = CatalogRepoActions::new(catalog as Arc<dyn EntryCataloger>, config);
        assert!(matches!(result, Err(ImportError::Config(_))));
    }

    #[test]
    fn progress_labels() {
        let catalog = catalog();
        let run = actions(&catalog, &[]);
        let [import, commit] = run.progress();
        assert_eq!(import.label(), "Objects imported");
        assert_eq!(commit.label(), "Commit progress");
        assert!(!import.is_active());
    }
}
