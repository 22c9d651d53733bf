//! Git operations and repository management

use std::path::{Path, PathBuf};

mod error;
mod parse;
mod repository;

pub use error::{DirtyKind, GitError, WtError, exit_code};
pub use repository::{BranchMode, FileCategory, Repository, WorkingTree, WorktreeStatus};

pub(crate) use parse::DefaultBranchName;

/// A registered working tree, as reported by `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    /// Commit hash; empty for the bare entry
    pub head: String,
    /// Short branch name; `None` when detached or bare
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
    /// Whether this entry contains the invocation's working directory
    pub current: bool,
}

impl Worktree {
    /// Directory name of the worktree, used for name matching and log context.
    pub fn dir_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Branch for display: the short name, or `(detached)`.
    pub fn branch_display(&self) -> &str {
        match (&self.branch, self.bare) {
            (Some(branch), _) => branch,
            (None, true) => "(bare)",
            (None, false) => "(detached)",
        }
    }

    /// Whether `name` addresses this worktree, by branch or by directory name.
    pub fn matches_name(&self, name: &str) -> bool {
        !self.bare && (self.branch.as_deref() == Some(name) || self.dir_name() == Some(name))
    }

    /// Whether `path` is this worktree's directory or lies inside it.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }
}

/// Pick the entry whose path is the deepest ancestor of `path`.
///
/// Worktrees under `.wt` are nested inside the main worktree, so plain
/// containment matches both; the deepest one is the one the path belongs to.
pub fn deepest_containing<'a>(worktrees: &'a [Worktree], path: &Path) -> Option<&'a Worktree> {
    worktrees
        .iter()
        .filter(|wt| wt.contains(path))
        .max_by_key(|wt| wt.path.components().count())
}
