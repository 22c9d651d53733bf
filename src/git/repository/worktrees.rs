//! Worktree listing, creation and removal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dunce::canonicalize;

use super::super::{DirtyKind, GitError, Worktree, deepest_containing};
use super::Repository;
use crate::path::format_path_for_display;

/// How `git worktree add` gets its branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchMode {
    /// Check out an existing local branch
    Existing,
    /// Create a local branch tracking a remote-tracking branch
    Track { remote_ref: String },
    /// Check out a tag or commit without a branch
    Detach,
    /// Create a new branch at `base`
    Create { base: String },
}

impl Repository {
    /// Registered worktrees, bare entry first, with `current` marked.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        let mut worktrees = Worktree::parse_porcelain_list(&stdout)?;

        for wt in &mut worktrees {
            // Git records the path as given; symlinked temp dirs need resolving
            if let Ok(path) = canonicalize(&wt.path) {
                wt.path = path;
            }
        }

        let current = deepest_containing(&worktrees, self.cwd()).map(|wt| wt.path.clone());
        for wt in &mut worktrees {
            wt.current = Some(&wt.path) == current.as_ref();
        }

        Ok(worktrees)
    }

    /// The anchor directory for templates and relative paths.
    ///
    /// For a non-bare repository this is the main worktree. For a bare one it
    /// is the common git directory, or its parent when that directory is named
    /// `.git` or `.bare`.
    pub fn main_root(&self) -> anyhow::Result<&Path> {
        self.cache
            .main_root
            .get_or_try_init(|| {
                if self.is_bare()? {
                    let common = self.git_common_dir()?;
                    let hidden = matches!(
                        common.file_name().and_then(|n| n.to_str()),
                        Some(".git" | ".bare")
                    );
                    return Ok(match common.parent() {
                        Some(parent) if hidden => parent.to_path_buf(),
                        _ => common.to_path_buf(),
                    });
                }

                let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
                let main = Worktree::parse_porcelain_list(&stdout)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| GitError::Other {
                        message: "git worktree list returned no entries".to_string(),
                    })?;
                canonicalize(&main.path).context("Failed to resolve main worktree")
            })
            .map(PathBuf::as_path)
    }

    /// Repository name used for `{gitroot}`: the main root's basename, without `.git`.
    pub fn gitroot_name(&self) -> anyhow::Result<String> {
        let root = self.main_root()?;
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GitError::Other {
                message: format!("Cannot name repository at {}", root.display()),
            })?;
        Ok(name.strip_suffix(".git").unwrap_or(name).to_string())
    }

    /// Decide how a worktree for `name` gets its branch.
    ///
    /// An existing local branch wins and `start_point` is ignored. Without a
    /// start point, a remote-tracking branch is tracked and any other ref is
    /// checked out detached. Everything else creates a new branch.
    pub fn branch_mode(&self, name: &str, start_point: Option<&str>) -> anyhow::Result<BranchMode> {
        if self.local_branch_exists(name)? {
            if let Some(start) = start_point {
                log::debug!("Branch {name} exists; ignoring start point {start}");
            }
            return Ok(BranchMode::Existing);
        }

        if let Some(base) = start_point {
            return Ok(BranchMode::Create {
                base: base.to_string(),
            });
        }

        if let Some(remote_ref) = self.tracking_ref_for(name)? {
            return Ok(BranchMode::Track { remote_ref });
        }

        if self.resolve_ref(name)?.is_some() {
            return Ok(BranchMode::Detach);
        }

        Ok(BranchMode::Create {
            base: "HEAD".to_string(),
        })
    }

    /// Register a worktree at `path` for `name`, using `mode`.
    pub fn add_worktree(&self, path: &Path, name: &str, mode: &BranchMode) -> anyhow::Result<()> {
        let path_str = path_str(path)?;
        let args: Vec<&str> = match mode {
            BranchMode::Existing => vec!["worktree", "add", path_str, name],
            BranchMode::Track { remote_ref } => {
                vec!["worktree", "add", "--track", "-b", name, path_str, remote_ref]
            }
            BranchMode::Detach => vec!["worktree", "add", "--detach", path_str, name],
            BranchMode::Create { base } => vec!["worktree", "add", "-b", name, path_str, base],
        };
        self.run_command(&args)?;
        Ok(())
    }

    /// Fail with [`GitError::DirtyWorktree`] if the worktree at `path` has
    /// untracked or modified files. Untracked files are reported first.
    pub fn ensure_clean(&self, path: &Path) -> anyhow::Result<()> {
        let status = self.worktree_at(path).status()?;
        let kind = if !status.untracked.is_empty() {
            DirtyKind::Untracked
        } else if !status.modified.is_empty() {
            DirtyKind::Modified
        } else {
            return Ok(());
        };
        Err(GitError::DirtyWorktree {
            path: path.to_path_buf(),
            kind,
        }
        .into())
    }

    /// Unregister the worktree at `path` and delete its directory.
    ///
    /// Without `force`, status is checked first so a dirty tree fails with
    /// [`GitError::DirtyWorktree`] naming what is in the way.
    pub fn remove_worktree(&self, path: &Path, force: bool) -> anyhow::Result<()> {
        if !force {
            self.ensure_clean(path)?;
        }

        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_str(path)?);
        self.run_command(&args)?;
        Ok(())
    }
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str().ok_or_else(|| {
        GitError::Other {
            message: format!(
                "Worktree path contains invalid UTF-8: {}",
                format_path_for_display(path)
            ),
        }
        .into()
    })
}
