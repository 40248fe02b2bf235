use crate::model::{ChangeKind, FileStat};
use std::collections::HashMap;

pub type LineCounts = (Option<u64>, Option<u64>);

/// Line counts for the files of one commit, taken from the commit's own
/// per-file stats rather than a second numeric diff.
pub struct LineStats<'s> {
    by_key: HashMap<&'s str, &'s FileStat>,
}

impl<'s> LineStats<'s> {
    pub fn new(stats: &'s [FileStat]) -> Self {
        Self {
            by_key: stats.iter().map(|stat| (stat.path.as_str(), stat)).collect(),
        }
    }

    /// `(lines_added, lines_removed)` for an already classified file.
    ///
    /// Renames, type changes and unmerged entries carry no content change;
    /// unknown and broken pairings have no meaningful counts. A count the
    /// stats cannot provide (binary content, missing key) is `None` and never
    /// an error.
    pub fn lines_for(&self, kind: ChangeKind, key: &str) -> LineCounts {
        match kind {
            ChangeKind::Added | ChangeKind::Modified | ChangeKind::Deleted | ChangeKind::Copied => self
                .by_key
                .get(key)
                .map(|stat| (stat.insertions, stat.deletions))
                .unwrap_or((None, None)),
            ChangeKind::Renamed
            | ChangeKind::TypeChanged
            | ChangeKind::Unmerged
            | ChangeKind::NotModified => (Some(0), Some(0)),
            ChangeKind::Unknown | ChangeKind::BrokenPairing => (None, None),
        }
    }
}
