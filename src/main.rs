//! `modman` command-line entry point: parses arguments and dispatches subcommands.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use modman_cli::cli::{Cli, Command};
use modman_cli::vcs::VcsKind;
use modman_cli::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(logging::Logger::new(args.command.name()));

    match &args.command {
        Command::Init => commands::init::run(&args.global, &log),
        Command::List => commands::list::run(&args.global, &log),
        Command::Deploy(opts) => commands::deploy::run(&args.global, opts, &log),
        Command::DeployAll => commands::deploy::run_all(&args.global, &log),
        Command::Update(opts) => commands::update::run(&args.global, opts, &log),
        Command::UpdateAll => commands::update::run_all(&args.global, &log),
        Command::Repair => commands::repair::run(&args.global, &log),
        Command::Clean => commands::clean::run(&args.global, &log),
        Command::Clone(opts) => commands::checkout::run(&args.global, opts, VcsKind::Git, &log),
        Command::Checkout(opts) => commands::checkout::run(&args.global, opts, VcsKind::Svn, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Status => commands::status::run(&args.global, commands::status::Report::Status, &log),
        Command::Incoming => {
            commands::status::run(&args.global, commands::status::Report::Incoming, &log)
        }
        Command::Version => {
            let version = option_env!("MODMAN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("modman {version}");
            Ok(())
        }
    }
}
