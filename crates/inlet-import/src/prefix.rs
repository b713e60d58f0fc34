//! The set of path prefixes an import replaces.

use serde::{Deserialize, Serialize};

/// An ordered set of path prefixes.
///
/// The set is normalized on construction: prefixes are sorted, duplicates are
/// removed, and any prefix that lies under another prefix in the set is
/// dropped. After normalization no prefix is a prefix of another, so the only
/// candidate that can cover a path is the greatest prefix not greater than
/// it, found by binary search.
///
/// An empty set covers every path: importing with no prefixes replaces the
/// whole tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PrefixSet {
    prefixes: Vec<String>,
}

impl PrefixSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        sorted.sort();
        sorted.dedup();

        let mut prefixes: Vec<String> = Vec::with_capacity(sorted.len());
        for prefix in sorted {
            // Sorted order puts a covering prefix right before everything it covers.
            if prefixes.last().is_some_and(|kept| prefix.starts_with(kept.as_str())) {
                continue;
            }
            prefixes.push(prefix);
        }
        Self { prefixes }
    }

    /// Returns `true` if `path` lies under some prefix of the set.
    pub fn covers(&self, path: &str) -> bool {
        if self.prefixes.is_empty() {
            return true;
        }
        let idx = self.prefixes.partition_point(|p| p.as_str() <= path);
        idx > 0 && path.starts_with(self.prefixes[idx - 1].as_str())
    }

    /// Returns `true` if no prefixes were configured (the whole tree is
    /// replaced).
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for PrefixSet {
    fn from(prefixes: Vec<String>) -> Self {
        Self::new(prefixes)
    }
}

impl From<PrefixSet> for Vec<String> {
    fn from(set: PrefixSet) -> Self {
        set.prefixes
    }
}
