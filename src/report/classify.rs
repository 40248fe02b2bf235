use crate::error::{GitLogError, Result};
use crate::model::{Baseline, ChangeKind, CommitInfo, DiffEntry};
use std::collections::HashMap;

/// A stat key resolved to the diff entry describing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'d> {
    pub entry: &'d DiffEntry,
    pub kind: ChangeKind,
}

/// Classifies the files of one commit against a diff computed once for that
/// commit.
pub struct ChangeClassifier<'d> {
    by_path: HashMap<&'d str, &'d DiffEntry>,
    /// Renames under their `old => new` stat key.
    renames: HashMap<String, &'d DiffEntry>,
}

impl<'d> ChangeClassifier<'d> {
    pub fn new(entries: &'d [DiffEntry]) -> Self {
        let mut by_path = HashMap::with_capacity(entries.len());
        let mut renames = HashMap::new();
        for entry in entries {
            by_path.entry(entry.path.as_str()).or_insert(entry);
            if entry.is_rename() {
                renames.entry(entry.stat_key()).or_insert(entry);
            }
        }
        Self { by_path, renames }
    }

    /// Find the diff entry for a stat key. Keys that do not address an entry
    /// directly are matched against the rename notation of each rename in the
    /// diff. Anything still unmatched means the stats and the diff disagree,
    /// which aborts the run.
    pub fn classify(&self, commit: &CommitInfo, baseline: &Baseline, key: &str) -> Result<Classification<'d>> {
        let entry = self
            .by_path
            .get(key)
            .or_else(|| self.renames.get(key))
            .copied()
            .ok_or_else(|| GitLogError::UnmatchedPath {
                baseline: baseline.to_string(),
                commit: commit.id.clone(),
                path: key.to_string(),
            })?;

        Ok(Classification {
            entry,
            kind: ChangeKind::from_status(entry.status, baseline),
        })
    }
}
