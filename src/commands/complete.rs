// Completion data for the shell wrappers: `git-wt __complete [<prefix>]`.
//
// Candidates are worktree branch names, worktree directory names and local
// branches, one per line. Errors produce no candidates rather than noise in
// the middle of a completion.

use std::collections::BTreeSet;

use git_wt::git::{Repository, Worktree};

use crate::output;

pub(crate) fn handle_complete(prefix: &str) -> anyhow::Result<()> {
    let candidates = match gather(prefix) {
        Ok(candidates) => candidates,
        Err(err) => {
            log::debug!("Completion failed: {err:#}");
            return Ok(());
        }
    };
    output::data(candidates.into_iter().collect::<Vec<_>>().join("\n"))?;
    Ok(())
}

fn gather(prefix: &str) -> anyhow::Result<BTreeSet<String>> {
    let repo = Repository::current()?;
    let worktrees = repo.list_worktrees()?;
    let branches = repo.local_branches()?;
    Ok(completion_candidates(&worktrees, &branches, prefix))
}

fn completion_candidates(
    worktrees: &[Worktree],
    branches: &[String],
    prefix: &str,
) -> BTreeSet<String> {
    let names = worktrees
        .iter()
        .filter(|wt| !wt.bare)
        .flat_map(|wt| [wt.branch.as_deref(), wt.dir_name()])
        .flatten();

    names
        .chain(branches.iter().map(String::as_str))
        .filter(|name| name.starts_with(prefix))
        .map(String::from)
        .collect()
}
