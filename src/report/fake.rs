//! In-memory history for exercising the report engine without a repository.

use crate::error::{GitLogError, Result};
use crate::model::{Baseline, CommitInfo, DiffEntry, FileStat};
use crate::vcs::VcsAccess;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct FakeVcs {
    commits: Vec<CommitInfo>,
    diffs: HashMap<String, Vec<DiffEntry>>,
    stats: HashMap<String, Vec<FileStat>>,
    commit_loads: Cell<usize>,
    diff_calls: RefCell<Vec<(Baseline, String)>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit with the given parents and return its id.
    pub fn add_commit(&mut self, parents: &[&str]) -> String {
        let n = self.commits.len() + 1;
        let id = format!("{n:040x}");
        self.commits.push(CommitInfo {
            id: id.clone(),
            author_name: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            message: format!("commit {n}\n"),
            timestamp: 1_700_000_000 + n as i64 * 60,
            parent_ids: parents.iter().map(|p| p.to_string()).collect(),
        });
        id
    }

    /// A file change reported consistently by both the diff and the stats.
    pub fn change(&mut self, commit: &str, entry: DiffEntry, stat: FileStat) {
        self.diff_entry(commit, entry);
        self.stat(commit, stat);
    }

    pub fn diff_entry(&mut self, commit: &str, entry: DiffEntry) {
        self.diffs.entry(commit.to_string()).or_default().push(entry);
    }

    pub fn stat(&mut self, commit: &str, stat: FileStat) {
        self.stats.entry(commit.to_string()).or_default().push(stat);
    }

    pub fn commit_loads(&self) -> usize {
        self.commit_loads.get()
    }

    pub fn diff_calls(&self) -> Vec<(Baseline, String)> {
        self.diff_calls.borrow().clone()
    }
}

impl VcsAccess for FakeVcs {
    fn list_commits(&self, tip: &str) -> Result<Vec<String>> {
        let mut reachable = HashSet::new();
        let mut stack = vec![tip.to_string()];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id.clone()) {
                continue;
            }
            let commit = self.commit(&id)?;
            stack.extend(commit.parent_ids);
        }
        self.commit_loads.set(0);

        // Parents are always created before their children.
        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|c| reachable.contains(&c.id))
            .map(|c| c.id.clone())
            .collect())
    }

    fn commit(&self, id: &str) -> Result<CommitInfo> {
        self.commit_loads.set(self.commit_loads.get() + 1);
        self.commits
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| GitLogError::InvalidCommitId(id.to_string()))
    }

    fn diff(&self, baseline: &Baseline, commit: &CommitInfo) -> Result<Vec<DiffEntry>> {
        self.diff_calls
            .borrow_mut()
            .push((baseline.clone(), commit.id.clone()));
        Ok(self.diffs.get(&commit.id).cloned().unwrap_or_default())
    }

    fn file_stats(&self, commit: &CommitInfo) -> Result<Vec<FileStat>> {
        Ok(self.stats.get(&commit.id).cloned().unwrap_or_default())
    }
}
