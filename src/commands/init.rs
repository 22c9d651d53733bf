use anyhow::Context;
use git_wt::shell::{Shell, ShellInit};

use crate::output;

pub(crate) fn handle_init(shell: Shell, nocd: bool) -> anyhow::Result<()> {
    let script = ShellInit::new(shell, nocd)
        .generate()
        .with_context(|| format!("Failed to generate {shell} integration"))?;
    output::data(script)?;
    Ok(())
}
