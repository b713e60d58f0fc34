//! Run statistics returned by `apply_import`.

use serde::{Deserialize, Serialize};

/// Summary of one import run, produced once when the meta-range is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Entries written from the inventory: new objects plus objects whose
    /// entries were replaced.
    pub added_or_changed: u64,
}

impl ImportStats {
    pub fn new(added_or_changed: u64) -> Self {
        Self { added_or_changed }
    }
}
