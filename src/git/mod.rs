mod repo;

pub use repo::{GitRepo, ResolvedBranch, WorktreeStatus};
