//! Deleting worktrees and branches (`-d` / `-D`).
//!
//! Targets run in argv order and the first failure stops the invocation.
//! Targets already processed stay deleted. Per target:
//!
//! 1. resolve to a worktree, or to a branch with no worktree
//! 2. refuse the bare entry and the main worktree
//! 3. check status (without `-D`), then run delete hooks inside the worktree
//! 4. remove the worktree, then delete its branch unless it is protected
//!
//! Failing to delete the branch after the worktree is gone is reported as a
//! warning, not an error.

use std::path::Path;

use color_print::cformat;
use git_wt::config::ConfigOverrides;
use git_wt::git::{GitError, Worktree};
use git_wt::path::{Argument, format_path_for_display};
use git_wt::shell::integration_active;
use git_wt::shell_exec::check_cancelled;
use git_wt::styling::{hint_message, success_message, warning_message};

use super::CommandContext;
use super::hooks::{HookKind, run_hooks};
use crate::output;

/// What a delete argument refers to.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Worktree(Worktree),
    /// A local branch that has no worktree
    BranchOnly(String),
}

pub(crate) fn handle_remove(
    targets: &[String],
    force: bool,
    allow_default: bool,
    overrides: &ConfigOverrides,
) -> anyhow::Result<()> {
    let mut ctx = CommandContext::load(overrides)?;
    let default_branch = ctx.repo.default_branch()?;
    log::debug!("Default branch: {default_branch:?}");

    for arg in targets {
        check_cancelled()?;
        let target = resolve_target(&ctx, arg)?;
        let protected = |branch: &str| !allow_default && default_branch.as_deref() == Some(branch);

        match target {
            Target::BranchOnly(branch) => {
                if protected(&branch) {
                    return Err(GitError::ProtectedDefaultBranch { branch }.into());
                }
                ctx.repo.delete_branch(&branch, force)?;
                output::message(success_message(cformat!("Deleted branch <bold>{branch}</>")));
            }
            Target::Worktree(wt) => {
                let keep_branch = wt.branch.as_deref().is_some_and(protected);
                remove_worktree(&ctx, &wt, force, keep_branch)?;
            }
        }

        // Later targets resolve against what is left
        ctx.worktrees = ctx.repo.list_worktrees()?;
    }
    Ok(())
}

/// Resolve one delete argument.
///
/// `.` and other paths go through the same classification as switching, so
/// they address the worktree containing them.
fn resolve_target(ctx: &CommandContext, arg: &str) -> anyhow::Result<Target> {
    let cwd = ctx.repo.cwd();
    let wt = match ctx.classify(arg) {
        Argument::Worktree(wt) => wt,
        Argument::PathHint(hint) => {
            return Err(GitError::NotAWorktree {
                path: cwd.join(hint),
            }
            .into());
        }
        Argument::Name(name) => {
            if ctx.repo.local_branch_exists(&name)? {
                return Ok(Target::BranchOnly(name));
            }
            return Err(GitError::TargetNotFound { target: name }.into());
        }
    };

    if wt.bare {
        return Err(GitError::ProtectedBare { path: wt.path }.into());
    }
    // The first non-bare entry of a non-bare repository is the main worktree
    if !ctx.repo.is_bare()? && wt.path == ctx.main_root {
        return Err(GitError::CannotRemoveMainWorktree { path: wt.path }.into());
    }
    Ok(Target::Worktree(wt))
}

fn remove_worktree(
    ctx: &CommandContext,
    wt: &Worktree,
    force: bool,
    keep_branch: bool,
) -> anyhow::Result<()> {
    let repo = &ctx.repo;
    let display_path = format_path_for_display(&wt.path);

    // Hooks must not run against a worktree the removal is going to refuse
    if !force {
        repo.ensure_clean(&wt.path)?;
    }
    run_hooks(HookKind::Delete, &ctx.config.delete_hooks, &wt.path)?;

    repo.remove_worktree(&wt.path, force)?;
    output::message(success_message(cformat!(
        "Removed worktree <bold>{display_path}</>"
    )));

    if let Some(branch) = &wt.branch {
        if keep_branch {
            output::message(warning_message(cformat!(
                "Branch <bold>{branch}</> retained: it is the default branch"
            )));
            output::message(hint_message(
                "Pass --allow-delete-default to delete it anyway",
            ));
        } else if let Err(err) = repo.delete_branch(branch, force) {
            log::debug!("Deleting branch {branch} failed: {err:#}");
            output::message(warning_message(cformat!(
                "Branch <bold>{branch}</> retained: git branch -d refused to delete it"
            )));
            output::message(hint_message("use -D to force deletion"));
        } else {
            output::message(success_message(cformat!("Deleted branch <bold>{branch}</>")));
        }
    }

    if wt.current {
        return_to_main_root(&ctx.main_root)?;
    }
    Ok(())
}

/// The invocation's directory is gone; point the shell back at the main root.
fn return_to_main_root(main_root: &Path) -> anyhow::Result<()> {
    if integration_active() {
        output::change_directory(main_root, false)?;
    } else {
        let target = shell_escape::escape(main_root.to_string_lossy());
        output::message(hint_message(cformat!(
            "The current directory was removed; run <bright-black>cd {target}</>"
        )));
    }
    Ok(())
}
