mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod provider;
mod references;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Manifest path, expanded
    pub manifest: PathBuf,
    /// State file path, expanded
    pub state: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        manifest: paths::expand_path(&cli.manifest),
        state: paths::expand_path(&cli.state),
    };
    log::debug!(
        "manifest={} state={} verbose={}",
        ctx.manifest.display(),
        ctx.state.display(),
        ctx.verbose
    );

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, args),
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Destroy(args) => commands::destroy::run(&ctx, args),
        Command::Refresh => commands::refresh::run(&ctx),
        Command::Show { address } => commands::show::run(&ctx, address.as_deref()),
        Command::Schema => commands::schema::run(),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "mockapi-provider", &mut io::stdout());
            Ok(())
        }
    }
}
