use super::{ChangeClassifier, CommitSequence, LineStats, ReportWriter};
use crate::cli::Cli;
use crate::error::Result;
use crate::git::{GitRepo, WorktreeStatus};
use crate::model::{Baseline, ChangeRecord, CommitInfo};
use crate::vcs::VcsAccess;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub commits: usize,
    pub records: usize,
}

pub fn exec(cli: &Cli) -> anyhow::Result<RunSummary> {
    let repo = GitRepo::open(&cli.path)?;
    debug!(
        repo = %repo.path().display(),
        bare = repo.is_bare(),
        "Opened repository"
    );
    match repo.worktree_status() {
        Ok(status) => warn_uncommitted(repo.path(), &status),
        Err(err) => debug!(error = %err, "Could not read working tree status"),
    }

    let branch = repo.resolve_branch(cli.branch.as_deref())?;
    debug!(branch = %branch.name, tip = ?branch.tip, "Resolved branch");

    let file = File::create(&cli.output_file)
        .with_context(|| format!("Failed to create output file {}", cli.output_file.display()))?;
    let mut writer = ReportWriter::begin(BufWriter::new(file), cli.report_style())
        .context("Failed to start report")?;

    let summary = write_report(&repo, branch.tip.as_deref(), &mut writer)
        .context("Failed to analyse commit history")?;
    writer.finish().context("Failed to finish report")?;

    debug!(
        "Wrote {} file modification record(s) from {} commit(s) in repo \"{}\" on branch \"{}\" to JSON file \"{}\"",
        summary.records,
        summary.commits,
        repo.path().display(),
        branch.name,
        cli.output_file.display()
    );
    Ok(summary)
}

/// Local edits never reach the report, which reads committed history only.
fn warn_uncommitted(repo: &Path, status: &WorktreeStatus) {
    if status.is_clean() {
        return;
    }
    if !status.modified.is_empty() {
        warn!(
            "Repo \"{}\" is dirty. The following files have been modified: {}",
            repo.display(),
            status.modified.join(", ")
        );
    }
    if !status.untracked.is_empty() {
        warn!(
            "Repo \"{}\" contains the following untracked files: {}",
            repo.display(),
            status.untracked.join(", ")
        );
    }
}

/// Walk the history ending at `tip` oldest first and write one record per
/// changed file. `None` is an unborn branch and produces no records.
pub fn write_report<V: VcsAccess + ?Sized, W: Write>(
    vcs: &V,
    tip: Option<&str>,
    writer: &mut ReportWriter<W>,
) -> Result<RunSummary> {
    let commits = match tip {
        Some(tip) => CommitSequence::new(vcs, tip)?,
        None => CommitSequence::empty(vcs),
    };

    let pb = ProgressBar::new(commits.remaining() as u64);
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Analysing commits...");

    let mut summary = RunSummary::default();
    for item in commits {
        let (commit, baseline) = item?;
        summary.records += write_commit(vcs, &commit, &baseline, writer)?;
        summary.commits += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(summary)
}

/// Classify and write every file the commit's stats report. The diff is
/// computed once for the whole commit.
pub fn write_commit<V: VcsAccess + ?Sized, W: Write>(
    vcs: &V,
    commit: &CommitInfo,
    baseline: &Baseline,
    writer: &mut ReportWriter<W>,
) -> Result<usize> {
    let diff = vcs.diff(baseline, commit)?;
    let stats = vcs.file_stats(commit)?;

    let classifier = ChangeClassifier::new(&diff);
    let lines = LineStats::new(&stats);

    for stat in &stats {
        let change = classifier.classify(commit, baseline, &stat.path)?;
        let record = ChangeRecord::new(
            commit,
            &change.entry.path,
            change.kind,
            lines.lines_for(change.kind, &stat.path),
        )?;
        writer.write_record(&record)?;
    }

    debug!(
        commit = %commit.id,
        baseline = %baseline,
        merge = commit.is_merge(),
        files = stats.len(),
        "Processed commit"
    );
    Ok(stats.len())
}
