use inlet_catalog::validate_branch_name;
use inlet_types::{BranchId, Ref, RepositoryId};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::prefix::PrefixSet;

/// Branch that receives import commits unless configured otherwise.
pub const DEFAULT_IMPORT_BRANCH: &str = "import-from-inventory";

/// Ref the import branch starts from when it is first created.
pub const DEFAULT_SOURCE_REF: &str = "main";

/// Immutable parameters of one import run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Repository to import into.
    pub repository: RepositoryId,
    /// Branch that receives the import commit; created on first import.
    pub branch: BranchId,
    /// Ref the branch is created from on first import.
    pub source_ref: Ref,
    /// Identity recorded as the committer.
    pub committer: String,
    /// Subtrees replaced by the import. Empty replaces the whole tree.
    pub prefixes: PrefixSet,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryId::new(""),
            branch: BranchId::new(DEFAULT_IMPORT_BRANCH),
            source_ref: Ref::new(DEFAULT_SOURCE_REF),
            committer: String::new(),
            prefixes: PrefixSet::default(),
        }
    }
}

impl ImportConfig {
    pub fn new(repository: RepositoryId, committer: impl Into<String>) -> Self {
        Self {
            repository,
            committer: committer.into(),
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: BranchId) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_source_ref(mut self, source_ref: Ref) -> Self {
        self.source_ref = source_ref;
        self
    }

    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = PrefixSet::new(prefixes);
        self
    }

    /// Parse and validate a TOML document.
    ///
    /// ```toml
    /// repository = "datalake"
    /// committer = "importer@example.com"
    /// prefixes = ["raw/2024/"]
    /// ```
    pub fn from_toml_str(s: &str) -> ImportResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ImportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.repository.as_str().is_empty() {
            return Err(ImportError::Config("repository must not be empty".into()));
        }
        if self.committer.is_empty() {
            return Err(ImportError::Config("committer must not be empty".into()));
        }
        validate_branch_name(self.branch.as_str())
            .map_err(|e| ImportError::Config(e.to_string()))?;
        if self.source_ref.as_str().is_empty() {
            return Err(ImportError::Config("source_ref must not be empty".into()));
        }
        Ok(())
    }
}

/// Per-call options for [`apply_import`](crate::RepoActions::apply_import).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Drain and count the merged stream without writing a meta-range.
    pub dry_run: bool,
}
