pub mod classify;
pub mod exec;
pub mod sequence;
pub mod stats;
pub mod writer;

#[cfg(test)]
pub(crate) mod fake;

pub use classify::{ChangeClassifier, Classification};
pub use exec::{exec, write_commit, write_report, RunSummary};
pub use sequence::CommitSequence;
pub use stats::{LineCounts, LineStats};
pub use writer::{ReportStyle, ReportWriter};
