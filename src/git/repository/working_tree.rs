//! WorkingTree - a handle for worktree-specific git operations.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, bail};

use crate::shell_exec::{Cmd, cancellation_error};

use super::super::parse::{parse_nul_paths, parse_status_porcelain};

/// Get a short display name for a path, used in logging context.
pub fn path_to_logging_context(path: &Path) -> String {
    if path.to_str() == Some(".") {
        ".".to_string()
    } else {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    }
}

/// Run `git <args>` in `dir` and return the raw output, whatever the exit status.
pub(super) fn git_output(dir: &Path, args: &[&str]) -> anyhow::Result<Output> {
    Cmd::new("git")
        .args(args.iter().copied())
        .current_dir(dir)
        .context(path_to_logging_context(dir))
        .run()
        .map_err(|e| {
            cancellation_error(&e).unwrap_or_else(|| {
                anyhow::Error::new(e).context(format!("Failed to execute: git {}", args.join(" ")))
            })
        })
}

/// Run `git <args>` in `dir`, failing with git's own stderr on a non-zero exit.
pub(super) fn git_stdout(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = git_output(dir, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Git uses \r for progress updates
        let stderr = stderr.replace('\r', "\n");
        for line in stderr.trim().lines() {
            log::debug!("  ! {}", line);
        }
        // Some git commands print errors to stdout
        let stdout = String::from_utf8_lossy(&output.stdout);
        let error_msg = [stderr.trim(), stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{}", error_msg);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    for line in stdout.trim().lines() {
        log::debug!("  {}", line);
    }
    Ok(stdout)
}

/// Category of files in a working tree, as `git ls-files` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FileCategory {
    Tracked,
    Modified,
    Untracked,
    Ignored,
}

impl FileCategory {
    fn ls_files_args(self) -> &'static [&'static str] {
        match self {
            FileCategory::Tracked => &["ls-files", "-z"],
            FileCategory::Modified => &["ls-files", "-z", "--modified"],
            FileCategory::Untracked => &["ls-files", "-z", "--others", "--exclude-standard"],
            FileCategory::Ignored => &[
                "ls-files",
                "-z",
                "--others",
                "--ignored",
                "--exclude-standard",
            ],
        }
    }
}

/// Paths reported by `git status`, relative to the worktree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    pub untracked: Vec<String>,
    pub modified: Vec<String>,
}

impl WorktreeStatus {
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty() && self.modified.is_empty()
    }
}

/// A handle for running git commands in a specific worktree.
///
/// ```no_run
/// use git_wt::git::{FileCategory, Repository};
///
/// let repo = Repository::current()?;
/// let wt = repo.worktree_at("/path/to/worktree");
/// let status = wt.status()?;
/// let ignored = wt.list_files(FileCategory::Ignored)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
#[must_use]
pub struct WorkingTree {
    pub(super) path: PathBuf,
}

impl WorkingTree {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        git_stdout(&self.path, args)
    }

    /// Untracked and modified paths, from `git status --porcelain -z`.
    pub fn status(&self) -> anyhow::Result<WorktreeStatus> {
        let stdout = self.run_command(&["status", "--porcelain", "-z"])?;
        Ok(parse_status_porcelain(&stdout))
    }

    /// Files in one category, relative to the worktree root.
    ///
    /// Must be called on the worktree root: `ls-files` reports paths relative
    /// to the directory it runs in.
    pub fn list_files(&self, category: FileCategory) -> anyhow::Result<Vec<String>> {
        let stdout = self
            .run_command(category.ls_files_args())
            .with_context(|| format!("Failed to list {category} files"))?;
        Ok(parse_nul_paths(&stdout).map(String::from).collect())
    }
}
