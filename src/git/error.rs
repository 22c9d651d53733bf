//! Error types and formatting
//!
//! - **`GitError`** - typed domain errors. Use `.into()` to convert to
//!   `anyhow::Error`; the type survives for `downcast_ref` pattern matching.
//!   Display produces the styled message users see.
//!
//! - **`WtError`** - semantic errors that main.rs maps to specific exit codes.

use std::path::PathBuf;

use color_print::cformat;

use crate::path::format_path_for_display;
use crate::styling::{error_message, hint_message};

/// What makes a worktree unsafe to delete without `-D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DirtyKind {
    Untracked,
    Modified,
}

/// Domain errors for worktree operations.
///
/// ```ignore
/// return Err(GitError::TargetNotFound { target: "feature".into() }.into());
///
/// if let Some(GitError::DirtyWorktree { kind, .. }) = err.downcast_ref() {
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub enum GitError {
    /// Argument combination clap cannot express; main.rs reports it as a clap usage error
    Usage {
        message: String,
    },
    /// A `wt.*` key holds a value that cannot be interpreted
    ConfigInvalid {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// A directory from the old `../<repo>-wt` default exists but `wt.basedir` is unset
    LegacyLayout {
        legacy_dir: PathBuf,
        gitroot: String,
    },
    DirtyWorktree {
        path: PathBuf,
        kind: DirtyKind,
    },
    ProtectedDefaultBranch {
        branch: String,
    },
    ProtectedBare {
        path: PathBuf,
    },
    CannotRemoveMainWorktree {
        path: PathBuf,
    },
    /// A path-like target that does not belong to any worktree
    NotAWorktree {
        path: PathBuf,
    },
    TargetNotFound {
        target: String,
    },
    CopyFailed {
        path: PathBuf,
        error: String,
    },
    ParseError {
        message: String,
    },
    Other {
        message: String,
    },
}

impl std::error::Error for GitError {}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::ConfigInvalid {
                key,
                value,
                expected,
            } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("invalid value <bold>{value}</> for <bold>{key}</>")),
                hint_message(cformat!(
                    "Expected {expected}; check <bright-black>git config --get {key}</>"
                ))
            ),

            GitError::LegacyLayout {
                legacy_dir,
                gitroot,
            } => {
                let legacy = format_path_for_display(legacy_dir);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "wt.basedir has changed: worktrees now default to <bold>.wt</> inside the repository, but <bold>{legacy}</> exists"
                    )),
                    hint_message(cformat!(
                        "To keep the old layout, run <bright-black>git config wt.basedir '../{gitroot}-wt'</>; otherwise move or remove <bold>{legacy}</>"
                    ))
                )
            }

            GitError::DirtyWorktree { path, kind } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("worktree <bold>{path}</> has {kind} files")),
                    hint_message(cformat!("<bright-black>use -D to force deletion</>"))
                )
            }

            GitError::ProtectedDefaultBranch { branch } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "refusing to delete default branch <bold>{branch}</>"
                )),
                hint_message(cformat!(
                    "Pass <bright-black>--allow-delete-default</> to delete it anyway"
                ))
            ),

            GitError::ProtectedBare { path } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}",
                    error_message(cformat!(
                        "cannot delete bare repository entry <bold>{path}</>"
                    ))
                )
            }

            GitError::CannotRemoveMainWorktree { path } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}",
                    error_message(cformat!("cannot delete the main worktree <bold>{path}</>"))
                )
            }

            GitError::NotAWorktree { path } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}",
                    error_message(cformat!("<bold>{path}</> is not inside any worktree"))
                )
            }

            GitError::TargetNotFound { target } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("no worktree or branch named <bold>{target}</>")),
                hint_message(cformat!(
                    "To list worktrees, run <bright-black>git wt</>"
                ))
            ),

            GitError::CopyFailed { path, error } => write!(
                f,
                "{}",
                error_message(cformat!(
                    "failed to copy <bold>{}</>: {error}",
                    path.display()
                ))
            ),

            GitError::Usage { message }
            | GitError::ParseError { message }
            | GitError::Other { message } => {
                write!(f, "{}", error_message(message))
            }
        }
    }
}

/// Semantic errors that require special handling in main.rs
#[derive(Debug)]
pub enum WtError {
    /// Child process exited with non-zero code
    ChildProcessExited { code: i32, message: String },
    /// A configured hook command failed
    HookFailed {
        command: String,
        exit_code: Option<i32>,
    },
    /// Interrupted by a signal; the process exits with 128 + signal
    Cancelled { signal: i32 },
}

impl std::fmt::Display for WtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WtError::ChildProcessExited { message, .. } => {
                write!(f, "{}", error_message(message))
            }
            WtError::HookFailed { command, .. } => {
                write!(
                    f,
                    "{}",
                    error_message(cformat!("hook failed: <bold>{command}</>"))
                )
            }
            WtError::Cancelled { signal } => {
                write!(f, "{}", error_message(format!("cancelled by signal {signal}")))
            }
        }
    }
}

impl std::error::Error for WtError {}

/// Extract the process exit code carried by a `WtError`, if any.
pub fn exit_code(err: &anyhow::Error) -> Option<i32> {
    err.downcast_ref::<WtError>().and_then(|e| match e {
        WtError::ChildProcessExited { code, .. } => Some(*code),
        WtError::HookFailed { exit_code, .. } => *exit_code,
        WtError::Cancelled { signal } => Some(128 + signal),
    })
}
