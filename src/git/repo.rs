use crate::error::{GitLogError, Result};
use crate::model::{rename_stat_key, Baseline, CommitInfo, DiffEntry, FileStat};
use crate::vcs::VcsAccess;
use gix::object::tree::diff::ChangeDetached;
use gix::objs::tree::EntryMode;
use gix::status::index_worktree::iter::Summary;
use gix::{ObjectId, Repository};
use similar::{ChangeTag, TextDiff};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Bytes inspected for a NUL when deciding whether a blob is binary.
const BINARY_PROBE_LEN: usize = 8000;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    last_changes: RefCell<Option<TreeChanges>>,
}

/// The most recent tree diff; the engine asks for the same commit's diff and
/// stats back to back.
struct TreeChanges {
    old: Option<ObjectId>,
    new: ObjectId,
    changes: Rc<Vec<ChangeDetached>>,
}

/// A branch name resolved to the commit it points at. `tip` is `None` for an
/// unborn branch, which has no history yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    pub name: String,
    pub tip: Option<String>,
}

/// Uncommitted state of the working tree. None of it appears in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
}

impl WorktreeStatus {
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.untracked.is_empty()
    }
}

impl GitRepo {
    /// Open the repository rooted at `path`. Parent directories are not searched.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(GitLogError::NotADirectory(path.to_path_buf()));
        }
        let path = path.canonicalize()?;

        let repo = gix::open(&path).map_err(|source| GitLogError::InvalidRepository {
            path: path.clone(),
            source: Box::new(source),
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self {
            repo,
            path,
            last_changes: RefCell::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// Index-to-worktree changes and untracked files. Bare repositories are
    /// always clean.
    pub fn worktree_status(&self) -> Result<WorktreeStatus> {
        let mut status = WorktreeStatus::default();
        if self.repo.is_bare() {
            return Ok(status);
        }

        let items = self
            .repo
            .status(gix::progress::Discard)
            .map_err(status_error)?
            .untracked_files(gix::status::UntrackedFiles::Files)
            .into_index_worktree_iter(Vec::<gix::bstr::BString>::new())
            .map_err(status_error)?;

        for item in items {
            let item = item.map_err(status_error)?;
            let path = item.rela_path().to_string();
            match item.summary() {
                Some(Summary::Added) => status.untracked.push(path),
                Some(_) => status.modified.push(path),
                None => {}
            }
        }

        status.modified.sort();
        status.untracked.sort();
        Ok(status)
    }

    /// Resolve `requested`, or the checked-out branch when `None`.
    pub fn resolve_branch(&self, requested: Option<&str>) -> Result<ResolvedBranch> {
        let Some(requested) = requested else {
            return self.current_branch();
        };

        let mut reference = self
            .find_branch(requested)?
            .ok_or_else(|| GitLogError::BranchNotFound {
                branch: requested.to_string(),
                repo: self.path.clone(),
            })?;
        let tip = reference.peel_to_id_in_place()?.detach();

        Ok(ResolvedBranch {
            name: reference.name().shorten().to_string(),
            tip: Some(tip.to_string()),
        })
    }

    fn current_branch(&self) -> Result<ResolvedBranch> {
        let mut head = self.repo.head()?;
        if head.is_detached() {
            return Err(GitLogError::DetachedHead(self.path.clone()));
        }

        let name = head
            .referent_name()
            .map(|name| name.shorten().to_string())
            .unwrap_or_else(|| "HEAD".to_string());
        if head.is_unborn() {
            return Ok(ResolvedBranch { name, tip: None });
        }

        let commit = head.peel_to_commit_in_place()?;
        Ok(ResolvedBranch {
            name,
            tip: Some(commit.id.to_string()),
        })
    }

    /// Look a name up with git's usual ref rules. `main` falls back to
    /// `master` for repositories created before the default changed. A name
    /// that is absent is `None`; an unreadable ref store is an error.
    fn find_branch(&self, name: &str) -> Result<Option<gix::Reference<'_>>> {
        if let Err(err) = <&gix::refs::PartialNameRef>::try_from(name) {
            debug!(reference = name, error = %err, "Not a valid reference name");
            return Ok(None);
        }
        if let Some(found) = self.repo.try_find_reference(name)? {
            return Ok(Some(found));
        }
        if name == "main" {
            debug!("No \"main\" reference, trying \"master\"");
            return Ok(self.repo.try_find_reference("master")?);
        }
        Ok(None)
    }

    fn commit_time(&self, id: ObjectId) -> Result<i64> {
        Ok(self.repo.find_commit(id)?.time()?.seconds)
    }

    fn tree_changes(&self, baseline: &Baseline, commit: &CommitInfo) -> Result<Rc<Vec<ChangeDetached>>> {
        let new = parse_id(&commit.id)?;
        let old = match baseline {
            Baseline::Parent(parent) => Some(parse_id(parent)?),
            Baseline::EmptyTree => None,
        };

        if let Some(cached) = self.last_changes.borrow().as_ref() {
            if cached.old == old && cached.new == new {
                return Ok(Rc::clone(&cached.changes));
            }
        }

        let commit_tree = self.repo.find_commit(new)?.tree()?;
        let changes: Vec<ChangeDetached> = match old {
            Some(parent_id) => {
                let parent_tree = self.repo.find_commit(parent_id)?.tree()?;
                self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?,
        };

        let changes = Rc::new(changes);
        *self.last_changes.borrow_mut() = Some(TreeChanges {
            old,
            new,
            changes: Rc::clone(&changes),
        });
        Ok(changes)
    }

    /// Text of a tree entry for line counting. `None` means binary.
    fn entry_text(&self, id: ObjectId, mode: EntryMode) -> Result<Option<String>> {
        if mode.is_commit() {
            return Ok(Some(format!("Subproject commit {id}\n")));
        }

        let object = self.repo.find_object(id)?;
        if is_binary(&object.data) {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&object.data).into_owned()))
    }

    fn line_stat(
        &self,
        key: String,
        old: Option<(ObjectId, EntryMode)>,
        new: Option<(ObjectId, EntryMode)>,
    ) -> Result<FileStat> {
        let old_text = match old {
            Some((id, mode)) => self.entry_text(id, mode)?,
            None => Some(String::new()),
        };
        let new_text = match new {
            Some((id, mode)) => self.entry_text(id, mode)?,
            None => Some(String::new()),
        };

        Ok(match (old_text, new_text) {
            (Some(old_text), Some(new_text)) => {
                let (added, removed) = count_changed_lines(&old_text, &new_text);
                FileStat::new(key, added, removed)
            }
            _ => FileStat::binary(key),
        })
    }
}

impl VcsAccess for GitRepo {
    /// Newest first by committer time, never emitting a commit before one of
    /// its descendants. Equal times keep breadth-first discovery order from the tip.
    fn list_commits(&self, tip: &str) -> Result<Vec<String>> {
        let tip = parse_id(tip)?;

        let mut discovered: HashMap<ObjectId, (i64, usize)> = HashMap::new();
        let mut parents: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        let mut children: HashMap<ObjectId, usize> = HashMap::new();
        let mut queue: VecDeque<ObjectId> = VecDeque::from([tip]);
        discovered.insert(tip, (self.commit_time(tip)?, 0));

        while let Some(commit_id) = queue.pop_front() {
            let commit = self.repo.find_commit(commit_id)?;
            let parent_ids: Vec<ObjectId> = commit.parent_ids().map(|id| id.detach()).collect();

            for pid in &parent_ids {
                *children.entry(*pid).or_insert(0) += 1;
                if !discovered.contains_key(pid) {
                    let order = discovered.len();
                    discovered.insert(*pid, (self.commit_time(*pid)?, order));
                    queue.push_back(*pid);
                }
            }
            parents.insert(commit_id, parent_ids);
        }

        let mut ready = BinaryHeap::from([(discovered[&tip].0, Reverse(0usize), tip)]);
        let mut ordered = Vec::with_capacity(discovered.len());

        while let Some((_, _, commit_id)) = ready.pop() {
            ordered.push(commit_id.to_string());
            for pid in parents.get(&commit_id).into_iter().flatten() {
                if let Some(remaining) = children.get_mut(pid) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        let (time, order) = discovered[pid];
                        ready.push((time, Reverse(order), *pid));
                    }
                }
            }
        }

        debug!(tip = %tip, commits = ordered.len(), "Listed reachable commits");
        Ok(ordered)
    }

    fn commit(&self, id: &str) -> Result<CommitInfo> {
        let oid = parse_id(id)?;
        let commit = self.repo.find_commit(oid)?;
        let author = commit.author()?;

        Ok(CommitInfo {
            id: oid.to_string(),
            author_name: author.name.to_string(),
            author_email: author.email.to_string(),
            message: commit.message_raw()?.to_string(),
            timestamp: commit.time()?.seconds,
            parent_ids: commit.parent_ids().map(|id| id.to_string()).collect(),
        })
    }

    fn diff(&self, baseline: &Baseline, commit: &CommitInfo) -> Result<Vec<DiffEntry>> {
        let changes = self.tree_changes(baseline, commit)?;
        Ok(changes.iter().filter_map(diff_entry).collect())
    }

    fn file_stats(&self, commit: &CommitInfo) -> Result<Vec<FileStat>> {
        let changes = self.tree_changes(&commit.baseline(), commit)?;
        let mut files = Vec::new();

        for change in changes.iter() {
            let stat = match change {
                ChangeDetached::Addition { location, entry_mode, id, .. } => {
                    if entry_mode.is_tree() {
                        continue;
                    }
                    self.line_stat(location.to_string(), None, Some((*id, *entry_mode)))?
                }
                ChangeDetached::Deletion { location, entry_mode, id, .. } => {
                    if entry_mode.is_tree() {
                        continue;
                    }
                    self.line_stat(location.to_string(), Some((*id, *entry_mode)), None)?
                }
                ChangeDetached::Modification {
                    location,
                    previous_entry_mode,
                    previous_id,
                    entry_mode,
                    id,
                    ..
                } => {
                    if entry_mode.is_tree() {
                        continue;
                    }
                    self.line_stat(
                        location.to_string(),
                        Some((*previous_id, *previous_entry_mode)),
                        Some((*id, *entry_mode)),
                    )?
                }
                ChangeDetached::Rewrite {
                    source_location,
                    source_entry_mode,
                    source_id,
                    location,
                    entry_mode,
                    id,
                    copy,
                    ..
                } => {
                    if entry_mode.is_tree() {
                        continue;
                    }
                    let key = if *copy {
                        location.to_string()
                    } else {
                        rename_stat_key(&source_location.to_string(), &location.to_string())
                    };
                    self.line_stat(
                        key,
                        Some((*source_id, *source_entry_mode)),
                        Some((*id, *entry_mode)),
                    )?
                }
            };
            files.push(stat);
        }

        Ok(files)
    }
}

fn status_error(err: impl std::fmt::Display) -> GitLogError {
    GitLogError::WorktreeStatus(err.to_string())
}

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::from_hex(id.as_bytes()).map_err(|e| GitLogError::InvalidCommitId(format!("{id}: {e}")))
}

fn diff_entry(change: &ChangeDetached) -> Option<DiffEntry> {
    match change {
        ChangeDetached::Addition { location, entry_mode, .. } => {
            (!entry_mode.is_tree()).then(|| DiffEntry::new(location.to_string(), 'A'))
        }
        ChangeDetached::Deletion { location, entry_mode, .. } => {
            (!entry_mode.is_tree()).then(|| DiffEntry::new(location.to_string(), 'D'))
        }
        ChangeDetached::Modification {
            location,
            previous_entry_mode,
            entry_mode,
            ..
        } => {
            if entry_mode.is_tree() {
                return None;
            }
            let status = if is_type_change(*previous_entry_mode, *entry_mode) { 'T' } else { 'M' };
            Some(DiffEntry::new(location.to_string(), status))
        }
        ChangeDetached::Rewrite {
            source_location,
            location,
            entry_mode,
            copy,
            ..
        } => {
            if entry_mode.is_tree() {
                return None;
            }
            let status = if *copy { 'C' } else { 'R' };
            Some(DiffEntry::rewrite(source_location.to_string(), location.to_string(), status))
        }
    }
}

/// Symlinks and submodules are distinct object types; the executable bit is not.
fn is_type_change(previous: EntryMode, current: EntryMode) -> bool {
    previous.is_link() != current.is_link() || previous.is_commit() != current.is_commit()
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

fn count_changed_lines(old: &str, new: &str) -> (u64, u64) {
    let diff = TextDiff::from_lines(old, new);
    diff.iter_all_changes()
        .fold((0, 0), |(added, removed), change| match change.tag() {
            ChangeTag::Insert => (added + 1, removed),
            ChangeTag::Delete => (added, removed + 1),
            ChangeTag::Equal => (added, removed),
        })
}
