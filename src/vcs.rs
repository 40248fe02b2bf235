//! Capabilities the report engine needs from a version-control backend.
//!
//! The engine only ever talks to history through [`VcsAccess`], so the gix
//! backend in [`crate::git`] can be swapped for another source of commits and
//! diffs, such as the in-memory fixture the tests use.

use crate::error::Result;
use crate::model::{Baseline, CommitInfo, DiffEntry, FileStat};

pub trait VcsAccess {
    /// Every commit reachable from `tip`, newest first. Repeated calls on an
    /// unchanged repository must return the same order.
    fn list_commits(&self, tip: &str) -> Result<Vec<String>>;

    fn commit(&self, id: &str) -> Result<CommitInfo>;

    /// Tree diff from `baseline` to `commit`, with rename detection.
    fn diff(&self, baseline: &Baseline, commit: &CommitInfo) -> Result<Vec<DiffEntry>>;

    /// Per-file insertion/deletion counts of `commit` against its first parent.
    fn file_stats(&self, commit: &CommitInfo) -> Result<Vec<FileStat>>;
}
