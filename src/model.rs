use crate::util::{extension_of, local_iso_date};
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Hash of the tree with no entries, the baseline for root commits.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub message: String,
    /// Committer time, seconds since the epoch.
    pub timestamp: i64,
    pub parent_ids: Vec<String>,
}

impl CommitInfo {
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// First parent, or the empty tree for root commits.
    pub fn baseline(&self) -> Baseline {
        match self.parent_ids.first() {
            Some(parent) => Baseline::Parent(parent.clone()),
            None => Baseline::EmptyTree,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    Parent(String),
    EmptyTree,
}

impl Baseline {
    pub fn is_empty_tree(&self) -> bool {
        matches!(self, Baseline::EmptyTree)
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Baseline::Parent(id) => f.write_str(id),
            Baseline::EmptyTree => f.write_str(EMPTY_TREE_SHA),
        }
    }
}

/// One entry of a baseline..commit tree diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: String,
    /// Previous location for renames and copies.
    pub source_path: Option<String>,
    /// git name-status letter (`A`, `M`, `R`, ...), if the backend reported one.
    pub status: Option<char>,
}

impl DiffEntry {
    pub fn new(path: impl Into<String>, status: char) -> Self {
        Self {
            path: path.into(),
            source_path: None,
            status: Some(status),
        }
    }

    pub fn rewrite(source: impl Into<String>, path: impl Into<String>, status: char) -> Self {
        Self {
            path: path.into(),
            source_path: Some(source.into()),
            status: Some(status),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.status == Some('R')
    }

    /// The key a rename is reported under in the per-file stats. Other
    /// entries are keyed by their path.
    pub fn stat_key(&self) -> String {
        match (&self.source_path, self.is_rename()) {
            (Some(source), true) => rename_stat_key(source, &self.path),
            _ => self.path.clone(),
        }
    }
}

/// The key `git diff --numstat` prints for a rename: `old => new`, with any
/// shared leading directories and trailing path folded outside braces, as in
/// `src/{a.rs => b.rs}` or `{old => new}/mod.rs`.
pub fn rename_stat_key(old: &str, new: &str) -> String {
    let (a, b) = (old.as_bytes(), new.as_bytes());

    let mut pfx = 0;
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if x != y {
            break;
        }
        if *x == b'/' {
            pfx = i + 1;
        }
    }

    // A non-empty prefix ends in '/', which the suffix may share.
    let floor = pfx.saturating_sub(1);
    let mut sfx = 0;
    let (mut i, mut j) = (a.len(), b.len());
    while i >= floor && j >= floor {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(j).copied().unwrap_or(0);
        if x != y {
            break;
        }
        if x == b'/' {
            sfx = a.len() - i;
        }
        if i == 0 || j == 0 {
            break;
        }
        i -= 1;
        j -= 1;
    }

    let a_mid = a.len().saturating_sub(pfx + sfx);
    let b_mid = b.len().saturating_sub(pfx + sfx);

    let mut key = Vec::with_capacity(a.len() + b.len() + 6);
    if pfx + sfx > 0 {
        key.extend_from_slice(&a[..pfx]);
        key.push(b'{');
    }
    key.extend_from_slice(&a[pfx..pfx + a_mid]);
    key.extend_from_slice(b" => ");
    key.extend_from_slice(&b[pfx..pfx + b_mid]);
    if pfx + sfx > 0 {
        key.push(b'}');
        key.extend_from_slice(&a[a.len() - sfx..]);
    }
    String::from_utf8_lossy(&key).into_owned()
}

/// Per-file line counts for a commit against its first parent, keyed the way
/// `git diff --numstat` keys them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub path: String,
    pub insertions: Option<u64>,
    pub deletions: Option<u64>,
}

impl FileStat {
    pub fn new(path: impl Into<String>, insertions: u64, deletions: u64) -> Self {
        Self {
            path: path.into(),
            insertions: Some(insertions),
            deletions: Some(deletions),
        }
    }

    /// Binary content: git prints `-` for both counts.
    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            insertions: None,
            deletions: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    #[serde(rename = "Type (mode) changed")]
    TypeChanged,
    Unmerged,
    Unknown,
    #[serde(rename = "Broken pairing")]
    BrokenPairing,
    #[serde(rename = "Not modified")]
    NotModified,
}

impl ChangeKind {
    /// Classify a name-status letter. With no letter at all the change is an
    /// addition when diffing against the empty tree, otherwise nothing changed.
    pub fn from_status(status: Option<char>, baseline: &Baseline) -> Self {
        match status {
            None => {
                if baseline.is_empty_tree() {
                    ChangeKind::Added
                } else {
                    ChangeKind::NotModified
                }
            }
            Some('A') => ChangeKind::Added,
            Some('C') => ChangeKind::Copied,
            Some('D') => ChangeKind::Deleted,
            Some('M') => ChangeKind::Modified,
            Some('R') => ChangeKind::Renamed,
            Some('T') => ChangeKind::TypeChanged,
            Some('U') => ChangeKind::Unmerged,
            Some('B') => ChangeKind::BrokenPairing,
            Some(_) => ChangeKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Deleted => "Deleted",
            ChangeKind::Renamed => "Renamed",
            ChangeKind::Copied => "Copied",
            ChangeKind::TypeChanged => "Type (mode) changed",
            ChangeKind::Unmerged => "Unmerged",
            ChangeKind::Unknown => "Unknown",
            ChangeKind::BrokenPairing => "Broken pairing",
            ChangeKind::NotModified => "Not modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single line of the report: one changed file in one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub revision: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub message: String,
    pub modified: String,
    pub extension: String,
    pub status: ChangeKind,
    pub lines_added: Option<u64>,
    pub lines_removed: Option<u64>,
}

impl ChangeRecord {
    pub fn new(
        commit: &CommitInfo,
        path: &str,
        status: ChangeKind,
        lines: (Option<u64>, Option<u64>),
    ) -> Result<Self> {
        Ok(Self {
            revision: commit.id.clone(),
            author: commit.author_name.clone(),
            email: commit.author_email.clone(),
            date: local_iso_date(commit.timestamp)?,
            message: commit.message.trim().to_string(),
            modified: path.to_string(),
            extension: extension_of(path),
            status,
            lines_added: lines.0,
            lines_removed: lines.1,
        })
    }
}
