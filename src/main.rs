//! dbSNP importer worker main executable

pub mod common;
pub mod subsnps;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "dbSNP importer worker",
    long_about = "This tool normalizes dbSNP SubSNPs into variants"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// SubSNP related commands.
    Subsnps(Subsnps),
}

/// Parsing of "subsnps *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Subsnps {
    /// The sub command to run
    #[command(subcommand)]
    command: SubsnpsCommands,
}

/// Enum supporting the parsing of "subsnps *" sub commands.
#[derive(Debug, Subcommand)]
enum SubsnpsCommands {
    Normalize(subsnps::normalize::Args),
    Samples(subsnps::samples::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Subsnps(subsnps) => match &subsnps.command {
                SubsnpsCommands::Normalize(args) => {
                    subsnps::normalize::run(&cli.common, args)?;
                }
                SubsnpsCommands::Samples(args) => {
                    subsnps::samples::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
