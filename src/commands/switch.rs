//! Create-or-switch: the single-argument form of `git wt`.

use std::path::{Path, PathBuf};

use color_print::cformat;
use git_wt::config::ConfigOverrides;
use git_wt::copy::FileCopier;
use git_wt::git::{BranchMode, GitError};
use git_wt::path::{
    Argument, check_legacy_layout, expand_basedir, format_path_for_display, relative_subdir,
    worktree_target,
};
use git_wt::styling::{info_message, success_message};

use super::CommandContext;
use super::hooks::{HookKind, run_hooks};
use crate::output;

/// Switch to the worktree `target` names, creating it first if there is none.
pub(crate) fn handle_switch(
    target: &str,
    start_point: Option<&str>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let cwd = ctx.repo.cwd().to_path_buf();

    match ctx.classify(target) {
        Argument::Worktree(wt) => {
            if let Some(start) = start_point {
                log::debug!("Worktree for {target} exists; ignoring start point {start}");
            }
            let dest = with_relative_subdir(&ctx, &wt.path, &cwd);
            output::change_directory(&dest, ctx.config.nocd.suppresses(false))?;
            Ok(())
        }
        Argument::PathHint(hint) => Err(GitError::NotAWorktree {
            path: cwd.join(hint),
        }
        .into()),
        Argument::Name(name) => {
            let path = create_worktree(&ctx, &name, start_point)?;
            let dest = with_relative_subdir(&ctx, &path, &cwd);
            output::change_directory(&dest, ctx.config.nocd.suppresses(true))?;
            Ok(())
        }
    }
}

/// Add a worktree for `name`, seed it with files and run create hooks.
fn create_worktree(
    ctx: &CommandContext,
    name: &str,
    start_point: Option<&str>,
) -> anyhow::Result<PathBuf> {
    let repo = &ctx.repo;
    let config = &ctx.config;
    let gitroot = repo.gitroot_name()?;
    check_legacy_layout(config.basedir_explicit, &ctx.main_root, &gitroot)?;

    let basedir = expand_basedir(&config.basedir, &ctx.main_root, &gitroot);
    let path = worktree_target(&basedir, name);
    // Built before touching git so a bad pattern fails without side effects
    let source = ctx.current_worktree().map(|wt| wt.path.clone());
    let copier = source
        .as_deref()
        .map(|source| FileCopier::new(config, source, &basedir))
        .transpose()?;

    let mode = repo.branch_mode(name, start_point)?;
    repo.add_worktree(&path, name, &mode)?;
    output::message(success_message(cformat!(
        "Created worktree for <bold>{name}</> @ <bold>{}</>{}",
        format_path_for_display(&path),
        describe_mode(&mode)
    )));

    match (&source, &copier) {
        (Some(source), Some(copier)) if copier.is_enabled() => {
            let copied = copier.run(&repo.worktree_at(source), &path)?;
            output::message(success_message(format!(
                "Copied {copied} file{}",
                if copied == 1 { "" } else { "s" }
            )));
        }
        (None, _) if config.copies_anything() => {
            output::message(info_message("No source worktree; skipping file copy"));
        }
        _ => {}
    }

    run_hooks(HookKind::Create, &config.hooks, &path)?;
    Ok(path)
}

fn describe_mode(mode: &BranchMode) -> String {
    match mode {
        BranchMode::Existing => String::new(),
        BranchMode::Track { remote_ref } => cformat!(", tracking <bold>{remote_ref}</>"),
        BranchMode::Detach => " (detached)".to_string(),
        BranchMode::Create { base } if base == "HEAD" => ", new branch".to_string(),
        BranchMode::Create { base } => cformat!(", new branch from <bold>{base}</>"),
    }
}

/// Apply `wt.relative`: carry the invocation's subdirectory into `target`.
fn with_relative_subdir(ctx: &CommandContext, target: &Path, cwd: &Path) -> PathBuf {
    if !ctx.config.relative {
        return target.to_path_buf();
    }
    match ctx.current_worktree() {
        Some(current) => relative_subdir(target, &current.path, cwd),
        None => target.to_path_buf(),
    }
}
