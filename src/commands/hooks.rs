use std::path::Path;

use color_print::cformat;
use git_wt::git::WtError;
use git_wt::shell_exec::execute_streaming;
use git_wt::styling::progress_message;

use crate::output;

/// Which configured hook list is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub(crate) enum HookKind {
    #[strum(serialize = "hook")]
    Create,
    #[strum(serialize = "deletehook")]
    Delete,
}

/// Run `commands` in order inside `dir`, stopping at the first failure.
///
/// Hook output goes to stderr so stdout stays free for the cd target. A
/// non-zero exit becomes [`WtError::HookFailed`] carrying the hook's exit
/// code.
pub(crate) fn run_hooks(kind: HookKind, commands: &[String], dir: &Path) -> anyhow::Result<()> {
    for command in commands {
        output::message(progress_message(cformat!(
            "Running {kind}: <bold>{command}</>"
        )));

        if let Err(err) = execute_streaming(command, dir) {
            return Err(match err.downcast_ref::<WtError>() {
                Some(WtError::ChildProcessExited { code, .. }) => WtError::HookFailed {
                    command: command.clone(),
                    exit_code: Some(*code),
                }
                .into(),
                _ => err,
            });
        }
    }
    Ok(())
}
