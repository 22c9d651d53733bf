pub(crate) mod complete;
pub(crate) mod hooks;
pub(crate) mod init;
pub(crate) mod list;
pub(crate) mod remove;
pub(crate) mod switch;

use std::path::PathBuf;

use git_wt::config::{Config, ConfigOverrides, NoCd};
use git_wt::git::{GitError, Repository, Worktree};
use git_wt::path::{Argument, classify_argument};
use git_wt::shell::Shell;

use crate::cli::Cli;

/// Positional that switches the binary into completion mode.
pub(crate) const COMPLETE_ARG: &str = "__complete";

/// What one invocation does, decided from the shape of the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    List {
        json: bool,
    },
    CreateOrSwitch {
        target: String,
        start_point: Option<String>,
    },
    Delete {
        targets: Vec<String>,
        force: bool,
        allow_default: bool,
    },
    InitShell {
        shell: Shell,
        nocd: bool,
    },
    Complete {
        prefix: String,
    },
}

impl Action {
    /// Map parsed arguments to an action.
    ///
    /// Combinations clap can't rule out on its own come back as
    /// [`GitError::Usage`].
    pub fn resolve(cli: &Cli) -> Result<Self, GitError> {
        let usage = |message: &str| GitError::Usage {
            message: message.to_string(),
        };
        let mut args = cli.args.clone();

        if args.first().is_some_and(|a| a == COMPLETE_ARG) {
            args.remove(0);
            if args.len() > 1 {
                return Err(usage("__complete takes at most one prefix"));
            }
            return Ok(Action::Complete {
                prefix: args.pop().unwrap_or_default(),
            });
        }

        if let Some(shell) = cli.init {
            if !args.is_empty() || cli.delete || cli.force_delete {
                return Err(usage("--init cannot be combined with targets or -d/-D"));
            }
            return Ok(Action::InitShell {
                shell,
                nocd: cli.nocd == Some(NoCd::Always),
            });
        }

        if cli.delete || cli.force_delete {
            if args.is_empty() {
                return Err(usage("-d/-D needs at least one worktree or branch to delete"));
            }
            return Ok(Action::Delete {
                targets: args,
                force: cli.force_delete,
                allow_default: cli.allow_delete_default,
            });
        }

        let mut args = args.into_iter();
        match (args.next(), args.next(), args.next()) {
            (None, _, _) => Ok(Action::List { json: cli.json }),
            (Some(target), start_point, None) => Ok(Action::CreateOrSwitch {
                target,
                start_point,
            }),
            _ => Err(usage(
                "too many arguments; expected <name|path> [<start-point>], or -d/-D to delete several",
            )),
        }
    }
}

/// Run `action` to completion.
pub(crate) fn run(action: Action, overrides: &ConfigOverrides) -> anyhow::Result<()> {
    match action {
        Action::List { json } => list::handle_list(json),
        Action::CreateOrSwitch {
            target,
            start_point,
        } => switch::handle_switch(&target, start_point.as_deref(), overrides),
        Action::Delete {
            targets,
            force,
            allow_default,
        } => remove::handle_remove(&targets, force, allow_default, overrides),
        Action::InitShell { shell, nocd } => init::handle_init(shell, nocd),
        Action::Complete { prefix } => complete::handle_complete(&prefix),
    }
}

/// Repository state shared by the commands that act on worktrees.
pub(crate) struct CommandContext {
    /// Anchored at the main root, so removing the current worktree is safe
    pub repo: Repository,
    pub config: Config,
    pub main_root: PathBuf,
    pub worktrees: Vec<Worktree>,
}

impl CommandContext {
    pub fn load(overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let repo = Repository::current()?.anchored()?;
        let config = Config::load(&repo, overrides)?;
        let main_root = repo.main_root()?.to_path_buf();
        let worktrees = repo.list_worktrees()?;
        Ok(Self {
            repo,
            config,
            main_root,
            worktrees,
        })
    }

    /// Classify a command-line argument against this repository's worktrees
    /// and branches.
    pub fn classify(&self, arg: &str) -> Argument {
        let is_branch = |name: &str| {
            self.repo.is_branch_name(name).unwrap_or_else(|err| {
                log::debug!("Checking whether {name} is a branch failed: {err:#}");
                false
            })
        };
        classify_argument(arg, &self.worktrees, &self.main_root, self.repo.cwd(), is_branch)
    }

    /// The non-bare worktree the invocation runs in.
    pub fn current_worktree(&self) -> Option<&Worktree> {
        self.worktrees.iter().find(|wt| wt.current && !wt.bare)
    }
}
