use std::path::PathBuf;

use super::{GitError, Worktree, WorktreeStatus};

impl Worktree {
    /// Parse `git worktree list --porcelain` output.
    ///
    /// `current` is left false; the repository marks it once the caller's
    /// directory is known.
    pub(crate) fn parse_porcelain_list(output: &str) -> Result<Vec<Self>, GitError> {
        let mut worktrees = Vec::new();
        let mut current: Option<Worktree> = None;

        for line in output.lines() {
            if line.is_empty() {
                worktrees.extend(current.take());
                continue;
            }

            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };

            match key {
                "worktree" => {
                    let path = value.ok_or_else(|| GitError::ParseError {
                        message: "worktree line missing path".to_string(),
                    })?;
                    worktrees.extend(current.take());
                    current = Some(Worktree {
                        path: PathBuf::from(path),
                        head: String::new(),
                        branch: None,
                        bare: false,
                        detached: false,
                        locked: None,
                        prunable: None,
                        current: false,
                    });
                }
                key => match (key, current.as_mut()) {
                    ("HEAD", Some(wt)) => {
                        wt.head = value
                            .ok_or_else(|| GitError::ParseError {
                                message: "HEAD line missing SHA".to_string(),
                            })?
                            .to_string();
                    }
                    ("branch", Some(wt)) => {
                        let branch_ref = value.ok_or_else(|| GitError::ParseError {
                            message: "branch line missing ref".to_string(),
                        })?;
                        let branch = branch_ref.strip_prefix("refs/heads/").unwrap_or(branch_ref);
                        wt.branch = Some(branch.to_string());
                    }
                    ("bare", Some(wt)) => wt.bare = true,
                    ("detached", Some(wt)) => wt.detached = true,
                    ("locked", Some(wt)) => {
                        wt.locked = Some(value.unwrap_or_default().to_string());
                    }
                    ("prunable", Some(wt)) => {
                        wt.prunable = Some(value.unwrap_or_default().to_string());
                    }
                    _ => {
                        // Unknown attributes, or attributes before the first worktree line
                    }
                },
            }
        }

        worktrees.extend(current);
        Ok(worktrees)
    }
}

/// Branch name read from `<remote>/HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultBranchName(String);

impl DefaultBranchName {
    /// Parse `git rev-parse --abbrev-ref <remote>/HEAD` output (`origin/main`).
    pub(crate) fn from_local(remote: &str, output: &str) -> Result<Self, GitError> {
        let trimmed = output.trim();
        let prefix = format!("{remote}/");
        let branch = trimmed.strip_prefix(&prefix).unwrap_or(trimmed);

        // An unset symref resolves to itself
        if branch.is_empty() || branch == "HEAD" {
            return Err(GitError::ParseError {
                message: format!("Empty branch name from {remote}/HEAD"),
            });
        }

        Ok(Self(branch.to_string()))
    }

    pub(crate) fn into_string(self) -> String {
        self.0
    }
}

/// Split NUL-terminated `git ls-files -z` output.
///
/// Entries ending in `/` are nested repositories (including worktrees placed
/// inside the repository) and are never copied.
pub(crate) fn parse_nul_paths(output: &str) -> impl Iterator<Item = &str> {
    output
        .split('\0')
        .filter(|entry| !entry.is_empty() && !entry.ends_with('/'))
}

/// Split `git status --porcelain -z` output into untracked and modified paths.
pub(crate) fn parse_status_porcelain(output: &str) -> WorktreeStatus {
    let mut status = WorktreeStatus::default();
    let mut entries = output.split('\0').filter(|e| !e.is_empty());

    while let Some(entry) = entries.next() {
        let (Some(code), Some(path)) = (entry.get(..2), entry.get(3..)) else {
            continue;
        };
        match code {
            "??" => status.untracked.push(path.to_string()),
            "!!" => {}
            _ => status.modified.push(path.to_string()),
        }
        // Renames and copies carry the original path as a separate entry
        if code.starts_with('R') || code.starts_with('C') {
            entries.next();
        }
    }

    status
}

/// Parse `git config -z --get-regexp` output into `(key, value)` pairs.
///
/// Each record is `key\nvalue\0`; a key set without `=` has no newline and
/// yields an empty value.
pub(crate) fn parse_config_z(output: &str) -> Vec<(String, String)> {
    output
        .split('\0')
        .filter(|record| !record.is_empty())
        .map(|record| match record.split_once('\n') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (record.to_string(), String::new()),
        })
        .collect()
}
