use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Styles};
use git_wt::config::{ConfigOverrides, NoCd, parse_bool};
use git_wt::shell::Shell;

/// Custom styles for help output
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

/// Parse a `--flag[=bool]` value with git's boolean spellings.
fn parse_bool_flag(s: &str) -> Result<bool, String> {
    parse_bool(s).ok_or_else(|| format!("expected a boolean (true/false, yes/no, on/off, 1/0), got '{s}'"))
}

const AFTER_HELP: &str = "\
Examples:
  git wt                       List worktrees
  git wt feature               Switch to feature, creating it under .wt/ if needed
  git wt feature origin/main   Create feature starting from origin/main
  git wt -d feature            Delete the worktree and its merged branch
  eval \"$(git-wt --init bash)\" Enable directory switching in bash

Every flag except -d, -D, --json, --init and --allow-delete-default has a
git config counterpart under wt.* (wt.basedir, wt.copyignored, wt.hook, ...).";

/// Create, switch to, list and delete git worktrees
#[derive(Parser, Debug)]
#[command(name = "git-wt", version, styles = help_styles(), after_help = AFTER_HELP)]
pub(crate) struct Cli {
    /// Worktree name, branch or path; a start point when creating; several targets with -d/-D
    #[arg(value_name = "TARGET")]
    pub args: Vec<String>,

    /// Delete worktrees and their branches, refusing dirty worktrees and unmerged branches
    #[arg(short = 'd', long, conflicts_with = "force_delete", help_heading = "Delete")]
    pub delete: bool,

    /// Delete worktrees and branches even when dirty or unmerged
    #[arg(short = 'D', long, help_heading = "Delete")]
    pub force_delete: bool,

    /// Allow deleting the default branch
    #[arg(long, help_heading = "Delete")]
    pub allow_delete_default: bool,

    /// List worktrees as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the shell integration script for a shell
    #[arg(long, value_name = "SHELL")]
    pub init: Option<Shell>,

    /// Directory for new worktrees; {gitroot} is the repository name
    #[arg(long, value_name = "TEMPLATE", help_heading = "Config overrides")]
    pub basedir: Option<String>,

    /// Copy ignored files into new worktrees
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag,
        help_heading = "Config overrides"
    )]
    pub copyignored: Option<bool>,

    /// Copy untracked files into new worktrees
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag,
        help_heading = "Config overrides"
    )]
    pub copyuntracked: Option<bool>,

    /// Copy modified tracked files into new worktrees
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag,
        help_heading = "Config overrides"
    )]
    pub copymodified: Option<bool>,

    /// Always copy files matching this pattern (repeatable)
    #[arg(long, value_name = "GLOB", help_heading = "Config overrides")]
    pub copy: Vec<String>,

    /// Never copy files matching this pattern (repeatable)
    #[arg(long, value_name = "GLOB", help_heading = "Config overrides")]
    pub nocopy: Vec<String>,

    /// Run a command in each new worktree (repeatable)
    #[arg(long, value_name = "CMD", help_heading = "Config overrides")]
    pub hook: Vec<String>,

    /// Run a command in a worktree before deleting it (repeatable)
    #[arg(long, value_name = "CMD", help_heading = "Config overrides")]
    pub deletehook: Vec<String>,

    /// Don't change directory: always (true), never (false), or only for new worktrees (create)
    #[arg(
        long,
        value_name = "WHEN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help_heading = "Config overrides"
    )]
    pub nocd: Option<NoCd>,

    /// Keep the current subdirectory when switching
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag,
        help_heading = "Config overrides"
    )]
    pub relative: Option<bool>,

    /// Show more output (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Per-invocation config overrides from the flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            basedir: self.basedir.clone(),
            copy_ignored: self.copyignored,
            copy_untracked: self.copyuntracked,
            copy_modified: self.copymodified,
            copy: self.copy.clone(),
            nocopy: self.nocopy.clone(),
            hooks: self.hook.clone(),
            delete_hooks: self.deletehook.clone(),
            nocd: self.nocd,
            relative: self.relative,
        }
    }
}
