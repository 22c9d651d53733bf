//! Output routing for the shell wrapper protocol.
//!
//! stdout carries only data (list tables, JSON, completions, scripts) and cd
//! targets, with the cd target always on the last line. Messages go to stderr.

use std::io::{self, Write};
use std::path::Path;

use git_wt::shell::integration_active;
use git_wt::styling::{FormattedMessage, eprintln};

/// Emit `path` as the cd target.
///
/// When `suppress` is set and a wrapper is listening, the line is prefixed
/// with `nocd:` so the wrapper prints the path instead of changing into it.
pub fn change_directory(path: &Path, suppress: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if suppress && integration_active() {
        writeln!(stdout, "nocd:{}", path.display())?;
    } else {
        writeln!(stdout, "{}", path.display())?;
    }
    stdout.flush()
}

/// Write data to stdout, terminated by a newline. Empty text writes nothing.
pub fn data(text: impl AsRef<str>) -> io::Result<()> {
    let text = text.as_ref();
    if text.is_empty() {
        return Ok(());
    }
    let mut stdout = anstream::stdout().lock();
    if text.ends_with('\n') {
        write!(stdout, "{text}")?;
    } else {
        writeln!(stdout, "{text}")?;
    }
    stdout.flush()
}

/// Write a status message to stderr.
pub fn message(msg: FormattedMessage) {
    eprintln!("{msg}");
}
