use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitLogError>;

#[derive(Error, Debug)]
pub enum GitLogError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{} is not a valid git repository: {source}", .path.display())]
    InvalidRepository {
        path: PathBuf,
        #[source]
        source: Box<gix::open::Error>,
    },
    #[error("Branch \"{branch}\" not found in repo \"{}\"", .repo.display())]
    BranchNotFound { branch: String, repo: PathBuf },
    #[error("No branch given and repo \"{}\" has no current branch (detached HEAD)", .0.display())]
    DetachedHead(PathBuf),
    #[error("No diff entry for {path} in {baseline}..{commit}")]
    UnmatchedPath {
        baseline: String,
        commit: String,
        path: String,
    },
    #[error("Invalid commit id: {0}")]
    InvalidCommitId(String),
    #[error("Working tree status error: {0}")]
    WorktreeStatus(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::Error>),
    #[error("Reference find error: {0}")]
    RefFindExisting(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Reference peel error: {0}")]
    RefPeel(#[from] Box<gix::reference::peel::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

impl GitLogError {
    /// Process exit status for this error. Configuration errors get their own
    /// codes; anything raised once the history walk has started is a failed run.
    pub fn exit_code(&self) -> u8 {
        match self {
            GitLogError::NotADirectory(_) => 1,
            GitLogError::InvalidRepository { .. } => 2,
            GitLogError::BranchNotFound { .. } => 3,
            GitLogError::DetachedHead(_) => 4,
            _ => 5,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.exit_code() < 5
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for GitLogError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GitLogError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for GitLogError {
    fn from(err: gix::object::commit::Error) -> Self {
        GitLogError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::Error> for GitLogError {
    fn from(err: gix::reference::find::Error) -> Self {
        GitLogError::RefFind(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for GitLogError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GitLogError::RefFindExisting(Box::new(err))
    }
}

impl From<gix::reference::peel::Error> for GitLogError {
    fn from(err: gix::reference::peel::Error) -> Self {
        GitLogError::RefPeel(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GitLogError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GitLogError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for GitLogError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GitLogError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GitLogError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GitLogError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for GitLogError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        GitLogError::DiffTreeToTree(Box::new(err))
    }
}
