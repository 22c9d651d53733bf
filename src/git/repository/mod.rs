use std::path::{Path, PathBuf};

use anyhow::Context;
use dunce::canonicalize;
use once_cell::sync::OnceCell;

use super::parse::parse_config_z;
use super::{DefaultBranchName, GitError};

mod working_tree;
mod worktrees;

pub use working_tree::{FileCategory, WorkingTree, WorktreeStatus, path_to_logging_context};
pub use worktrees::BranchMode;

use working_tree::{git_output, git_stdout};

/// Cached values for git queries that can't change during one invocation.
#[derive(Debug, Default)]
struct RepoCache {
    git_common_dir: OnceCell<PathBuf>,
    is_bare: OnceCell<bool>,
    main_root: OnceCell<PathBuf>,
    primary_remote: OnceCell<String>,
}

/// Repository context for git operations.
///
/// Git commands run in `path`. `cwd` is the directory the tool was invoked
/// from; it decides which worktree is current and never changes, even after
/// the repository is re-anchored at its main root.
///
/// ```no_run
/// use git_wt::git::Repository;
///
/// let repo = Repository::current()?.anchored()?;
/// let main_root = repo.main_root()?;
/// let default_branch = repo.default_branch()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    cwd: PathBuf,
    cache: RepoCache,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            cwd: path.clone(),
            path,
            cache: RepoCache::default(),
        }
    }

    /// Create a repository context for the current directory.
    pub fn current() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let cwd = canonicalize(&cwd).unwrap_or(cwd);
        Ok(Self::at(cwd))
    }

    /// Move git execution to a directory that survives worktree removal.
    ///
    /// Non-bare repositories run from the main worktree, bare ones from the
    /// common git directory. The invocation directory is kept for `current`.
    pub fn anchored(self) -> anyhow::Result<Self> {
        let anchor = if self.is_bare()? {
            self.git_common_dir()?.to_path_buf()
        } else {
            self.main_root()?.to_path_buf()
        };
        Ok(Self {
            path: anchor,
            cwd: self.cwd,
            cache: self.cache,
        })
    }

    /// Directory the tool was invoked from, canonicalized.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// A handle for running commands in the worktree at `path`.
    pub fn worktree_at(&self, path: impl Into<PathBuf>) -> WorkingTree {
        WorkingTree { path: path.into() }
    }

    /// Get the primary remote name for this repository.
    ///
    /// 1. `checkout.defaultRemote` if set and it has a URL
    /// 2. The first remote with a configured URL
    /// 3. `origin`
    pub fn primary_remote(&self) -> anyhow::Result<&str> {
        self.cache
            .primary_remote
            .get_or_try_init(|| {
                if let Ok(default_remote) = self.run_command(&["config", "checkout.defaultRemote"])
                {
                    let default_remote = default_remote.trim();
                    if !default_remote.is_empty() && self.remote_has_url(default_remote) {
                        return Ok(default_remote.to_string());
                    }
                }

                // Skip phantom remotes from global config that have no URL
                let output = self
                    .run_command(&["config", "--get-regexp", r"remote\..+\.url"])
                    .unwrap_or_default();
                let first_remote = output.lines().next().and_then(|line| {
                    // "remote.<name>.url <value>"; names may contain dots
                    line.strip_prefix("remote.")
                        .and_then(|s| s.split_once(".url "))
                        .map(|(name, _)| name)
                });

                Ok(first_remote.unwrap_or("origin").to_string())
            })
            .map(String::as_str)
    }

    fn remote_has_url(&self, remote: &str) -> bool {
        self.run_command(&["config", &format!("remote.{remote}.url")])
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }

    /// Check if a local git branch exists.
    pub fn local_branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        self.run_command_check(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{branch}"),
        ])
    }

    /// Check if a branch exists locally or as a remote-tracking branch.
    pub fn branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        if self.local_branch_exists(branch)? {
            return Ok(true);
        }
        Ok(!self.remotes_with_branch(branch)?.is_empty())
    }

    /// Local branch names, in ref order.
    pub fn local_branches(&self) -> anyhow::Result<Vec<String>> {
        // lstrip=2 rather than refname:short, which prefixes "heads/" when ambiguous
        let stdout = self.run_command(&["branch", "--format=%(refname:lstrip=2)"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }

    /// Remotes that have a remote-tracking branch named `branch`.
    pub fn remotes_with_branch(&self, branch: &str) -> anyhow::Result<Vec<String>> {
        let output = self.run_command(&[
            "for-each-ref",
            "--format=%(refname:strip=2)",
            &format!("refs/remotes/*/{branch}"),
        ])?;

        let suffix = format!("/{branch}");
        Ok(output
            .lines()
            .filter_map(|line| line.trim().strip_suffix(&suffix).map(String::from))
            .collect())
    }

    /// The remote-tracking ref to base a new local `branch` on, if any.
    ///
    /// Prefers the primary remote when several remotes carry the branch.
    pub fn tracking_ref_for(&self, branch: &str) -> anyhow::Result<Option<String>> {
        let remotes = self.remotes_with_branch(branch)?;
        let primary = self.primary_remote()?;
        let remote = remotes
            .iter()
            .find(|r| r.as_str() == primary)
            .or_else(|| remotes.first());
        Ok(remote.map(|remote| format!("{remote}/{branch}")))
    }

    /// Resolve `name` to a commit hash, or `None` if it names no commit.
    pub fn resolve_ref(&self, name: &str) -> anyhow::Result<Option<String>> {
        let output = git_output(
            &self.path,
            &["rev-parse", "--verify", "--quiet", &format!("{name}^{{commit}}")],
        )?;
        if !output.status.success() {
            return Ok(None);
        }
        let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(commit).filter(|c| !c.is_empty()))
    }

    /// Whether `name` resolves to a commit through a local or remote-tracking branch.
    pub fn is_branch_name(&self, name: &str) -> anyhow::Result<bool> {
        if self.resolve_ref(name)?.is_none() {
            return Ok(false);
        }
        self.branch_exists(name)
    }

    /// Delete a local branch with `git branch -d`, or `-D` when forced.
    pub fn delete_branch(&self, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_command(&["branch", flag, branch])?;
        Ok(())
    }

    /// Detect the default branch from local state only.
    ///
    /// Tries `<remote>/HEAD`, then `init.defaultBranch` if that branch exists,
    /// then the conventional names, then a lone local branch. Never fetches.
    pub fn default_branch(&self) -> anyhow::Result<Option<String>> {
        let remote = self.primary_remote()?;
        if let Ok(stdout) =
            self.run_command(&["rev-parse", "--abbrev-ref", &format!("{remote}/HEAD")])
            && let Ok(branch) = DefaultBranchName::from_local(remote, &stdout)
        {
            return Ok(Some(branch.into_string()));
        }

        let branches = self.local_branches()?;

        if let Ok(default) = self.run_command(&["config", "--get", "init.defaultBranch"]) {
            let default = default.trim();
            if branches.iter().any(|b| b == default) {
                return Ok(Some(default.to_string()));
            }
        }

        for name in ["main", "master", "develop", "trunk"] {
            if branches.iter().any(|b| b == name) {
                return Ok(Some(name.to_string()));
            }
        }

        if let [only] = branches.as_slice() {
            return Ok(Some(only.clone()));
        }

        log::debug!("Could not infer default branch");
        Ok(None)
    }

    /// The shared git directory, absolute.
    ///
    /// For linked worktrees this is the main `.git` directory, not
    /// `.git/worktrees/<name>`.
    pub fn git_common_dir(&self) -> anyhow::Result<&Path> {
        self.cache
            .git_common_dir
            .get_or_try_init(|| {
                let stdout = self.run_command(&["rev-parse", "--git-common-dir"])?;
                let path = PathBuf::from(stdout.trim());
                let path = if path.is_relative() {
                    self.path.join(&path)
                } else {
                    path
                };
                canonicalize(&path).context("Failed to resolve git common directory")
            })
            .map(PathBuf::as_path)
    }

    /// Whether the repository is bare (`core.bare`).
    pub fn is_bare(&self) -> anyhow::Result<bool> {
        self.cache
            .is_bare
            .get_or_try_init(|| {
                let output = git_output(&self.path, &["config", "--bool", "core.bare"])?;
                Ok(output.status.success()
                    && String::from_utf8_lossy(&output.stdout).trim() == "true")
            })
            .copied()
    }

    /// All `git config` entries whose key matches `pattern`, in file order.
    ///
    /// No match is an empty list, not an error.
    pub fn config_entries(&self, pattern: &str) -> anyhow::Result<Vec<(String, String)>> {
        let args = ["config", "-z", "--get-regexp", pattern];
        let output = git_output(&self.path, &args)?;
        match output.status.code() {
            Some(0) => Ok(parse_config_z(&String::from_utf8_lossy(&output.stdout))),
            Some(1) => Ok(Vec::new()),
            _ => Err(GitError::Other {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
            .with_context(|| format!("Failed to execute: git {}", args.join(" "))),
        }
    }

    /// Run a git command in this repository's context and return stdout.
    ///
    /// A non-zero exit is an error carrying git's stderr.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        git_stdout(&self.path, args)
    }

    /// Run a git command and return whether it exited 0.
    pub fn run_command_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        Ok(git_output(&self.path, args)?.status.success())
    }
}
