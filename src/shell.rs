//! Shell wrapper generation for `git-wt --init <shell>`.
//!
//! Each wrapper defines a `git` function that intercepts `git wt …`, runs the
//! binary with `GIT_WT_SHELL_INTEGRATION=1`, and interprets the last line of
//! stdout:
//! - `nocd:<path>` prints `<path>`
//! - an existing directory is changed into (or printed, in no-cd mode)
//! - anything else is printed unchanged
//!
//! Every other `git` invocation passes through to `command git`.

use askama::Template;

/// Environment variable the wrappers set so the binary knows it is wrapped.
pub const INTEGRATION_ENV_VAR: &str = "GIT_WT_SHELL_INTEGRATION";

/// Whether the process is running under a shell wrapper.
pub fn integration_active() -> bool {
    std::env::var(INTEGRATION_ENV_VAR).is_ok_and(|v| v == "1")
}

/// Supported shells
///
/// On Windows, Git Bash users should use `bash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Shell {
    Bash,
    Fish,
    Zsh,
    #[strum(serialize = "powershell")]
    #[clap(name = "powershell")]
    PowerShell,
}

/// Shell integration configuration
pub struct ShellInit {
    pub shell: Shell,
    /// Bake no-cd mode into the wrapper instead of reading `wt.nocd` at runtime
    pub nocd: bool,
}

impl ShellInit {
    pub fn new(shell: Shell, nocd: bool) -> Self {
        Self { shell, nocd }
    }

    /// Render the wrapper script.
    pub fn generate(&self) -> Result<String, askama::Error> {
        let nocd = self.nocd;
        match self.shell {
            Shell::Bash => BashTemplate { nocd }.render(),
            Shell::Zsh => ZshTemplate { nocd }.render(),
            Shell::Fish => FishTemplate { nocd }.render(),
            Shell::PowerShell => PowerShellTemplate { nocd }.render(),
        }
    }
}

#[derive(Template)]
#[template(path = "bash.sh", escape = "none")]
struct BashTemplate {
    nocd: bool,
}

#[derive(Template)]
#[template(path = "zsh.zsh", escape = "none")]
struct ZshTemplate {
    nocd: bool,
}

#[derive(Template)]
#[template(path = "fish.fish", escape = "none")]
struct FishTemplate {
    nocd: bool,
}

#[derive(Template)]
#[template(path = "powershell.ps1", escape = "none")]
struct PowerShellTemplate {
    nocd: bool,
}
