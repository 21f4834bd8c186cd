//! Classification of path-level changes between two snapshots.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::snapshot::Snapshot;

/// How a single path changed between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    /// Content differs
    Modified,
    /// Same content, different modification time
    Touched,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
            ChangeKind::Touched => "touched",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The difference between an earlier snapshot (`start`) and a later one (`end`).
///
/// The four sets are disjoint. A path present in both snapshots with equal
/// fingerprints and equal timestamps is in none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    added: BTreeSet<String>,
    removed: BTreeSet<String>,
    modified: BTreeSet<String>,
    touched: BTreeSet<String>,
}

impl SnapshotDiff {
    /// Same as [`diff`]
    pub fn between(start: &Snapshot, end: &Snapshot) -> Self {
        diff(start, end)
    }

    /// Present in `end`, absent in `start`
    pub fn added(&self) -> &BTreeSet<String> {
        &self.added
    }

    /// Present in `start`, absent in `end`
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Present in both with different fingerprints
    pub fn modified(&self) -> &BTreeSet<String> {
        &self.modified
    }

    /// Present in both with equal fingerprints but different timestamps
    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of changed paths across all four sets
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len() + self.touched.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.change_of(key).is_some()
    }

    pub fn change_of(&self, key: &str) -> Option<ChangeKind> {
        if self.added.contains(key) {
            Some(ChangeKind::Added)
        } else if self.removed.contains(key) {
            Some(ChangeKind::Removed)
        } else if self.modified.contains(key) {
            Some(ChangeKind::Modified)
        } else if self.touched.contains(key) {
            Some(ChangeKind::Touched)
        } else {
            None
        }
    }

    /// Every changed path with its kind, ordered by path
    pub fn changes(&self) -> Vec<(&str, ChangeKind)> {
        let mut changes: Vec<(&str, ChangeKind)> = self
            .added
            .iter()
            .map(|p| (p.as_str(), ChangeKind::Added))
            .chain(self.removed.iter().map(|p| (p.as_str(), ChangeKind::Removed)))
            .chain(self.modified.iter().map(|p| (p.as_str(), ChangeKind::Modified)))
            .chain(self.touched.iter().map(|p| (p.as_str(), ChangeKind::Touched)))
            .collect();
        changes.sort();
        changes
    }
}

/// Compare two snapshots. Fingerprints are checked before timestamps, so a
/// file rewritten with identical bytes is `touched`, never `modified`.
pub fn diff(start: &Snapshot, end: &Snapshot) -> SnapshotDiff {
    let mut result = SnapshotDiff::default();

    for record in end.iter() {
        if start.record(&record.path).is_none() {
            result.added.insert(record.path.clone());
        }
    }

    for before in start.iter() {
        let Some(after) = end.record(&before.path) else {
            result.removed.insert(before.path.clone());
            continue;
        };

        if before.fingerprint != after.fingerprint {
            result.modified.insert(before.path.clone());
        } else if before.modified != after.modified {
            result.touched.insert(before.path.clone());
        }
    }

    result
}
