//! Worktree management as a single git subcommand.
//!
//! `git-wt` is a CLI tool; this library holds the parts that don't depend on
//! argument parsing: the git adapter, configuration, path resolution, file
//! copying, shell wrappers and subprocess execution. The API is not stable.

pub mod config;
pub mod copy;
pub mod git;
pub mod path;
pub mod shell;
pub mod shell_exec;
pub mod styling;
