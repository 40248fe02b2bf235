use crate::error::Result;
use crate::model::{Baseline, CommitInfo};
use crate::vcs::VcsAccess;
use std::iter::Rev;
use std::vec::IntoIter;

/// Commits of a branch paired with the baseline each is diffed against,
/// oldest first. Only the ids are listed up front; metadata is loaded as the
/// sequence is consumed.
///
/// Merge commits are compared with their first parent only, so changes that
/// exist purely in the merge resolution against other parents are not
/// reported.
pub struct CommitSequence<'a, V: VcsAccess + ?Sized> {
    vcs: &'a V,
    ids: Rev<IntoIter<String>>,
}

impl<'a, V: VcsAccess + ?Sized> CommitSequence<'a, V> {
    pub fn new(vcs: &'a V, tip: &str) -> Result<Self> {
        let newest_first = vcs.list_commits(tip)?;
        Ok(Self {
            vcs,
            ids: newest_first.into_iter().rev(),
        })
    }

    /// History of an unborn branch.
    pub fn empty(vcs: &'a V) -> Self {
        Self {
            vcs,
            ids: Vec::new().into_iter().rev(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.ids.len()
    }
}

impl<V: VcsAccess + ?Sized> Iterator for CommitSequence<'_, V> {
    type Item = Result<(CommitInfo, Baseline)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.vcs.commit(&id).map(|commit| {
            let baseline = commit.baseline();
            (commit, baseline)
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fake::FakeVcs;
    use pretty_assertions::assert_eq;

    #[test]
    fn yields_oldest_first_with_baselines() {
        let mut vcs = FakeVcs::new();
        let c1 = vcs.add_commit(&[]);
        let c2 = vcs.add_commit(&[c1.as_str()]);
        let c3 = vcs.add_commit(&[c2.as_str()]);

        let pairs: Vec<(String, Baseline)> = CommitSequence::new(&vcs, &c3)
            .unwrap()
            .map(|item| item.map(|(commit, baseline)| (commit.id, baseline)))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            pairs,
            vec![
                (c1.clone(), Baseline::EmptyTree),
                (c2.clone(), Baseline::Parent(c1)),
                (c3, Baseline::Parent(c2)),
            ]
        );
    }

    #[test]
    fn merge_commit_uses_first_parent() {
        let mut vcs = FakeVcs::new();
        let base = vcs.add_commit(&[]);
        let main = vcs.add_commit(&[base.as_str()]);
        let feature = vcs.add_commit(&[base.as_str()]);
        let merge = vcs.add_commit(&[main.as_str(), feature.as_str()]);

        let (commit, baseline) = CommitSequence::new(&vcs, &merge)
            .unwrap()
            .last()
            .unwrap()
            .unwrap();
        assert_eq!(commit.id, merge);
        assert_eq!(baseline, Baseline::Parent(main));
    }

    #[test]
    fn metadata_is_loaded_lazily() {
        let mut vcs = FakeVcs::new();
        let c1 = vcs.add_commit(&[]);
        let c2 = vcs.add_commit(&[c1.as_str()]);

        let mut sequence = CommitSequence::new(&vcs, &c2).unwrap();
        assert_eq!(vcs.commit_loads(), 0);
        assert_eq!(sequence.remaining(), 2);
        sequence.next().unwrap().unwrap();
        assert_eq!(vcs.commit_loads(), 1);
        assert_eq!(sequence.remaining(), 1);
    }

    #[test]
    fn unborn_branch_has_no_commits() {
        let vcs = FakeVcs::new();
        assert_eq!(CommitSequence::empty(&vcs).count(), 0);
    }
}
