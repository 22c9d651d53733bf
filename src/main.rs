use std::io::Write;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use git_wt::git::{GitError, WtError, exit_code};
use git_wt::shell_exec::install_signal_handlers;
use git_wt::styling::{eprintln, error_message};

mod cli;
mod commands;
mod output;

use cli::Cli;
use commands::Action;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG, when set, overrides the -v level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = install_signal_handlers() {
        log::warn!("Failed to install signal handlers: {e}");
    }

    let action = match Action::resolve(&cli) {
        Ok(action) => action,
        Err(GitError::Usage { message }) => Cli::command()
            .error(ErrorKind::ArgumentConflict, message)
            .exit(),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    log::debug!("Action: {action:?}");

    if let Err(e) = commands::run(action, &cli.overrides()) {
        // Typed errors render their own message; plain anyhow chains show their causes
        if e.downcast_ref::<GitError>().is_some() || e.downcast_ref::<WtError>().is_some() {
            eprintln!("{e}");
        } else {
            eprintln!("{}", error_message(format!("{e:#}")));
        }
        process::exit(exit_code(&e).unwrap_or(1));
    }
}
