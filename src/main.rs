//! seqr cohort worker main executable

pub mod common;
pub mod err;
pub mod export;
pub mod groups;
pub mod seqr;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "seqr cohort metadata worker",
    long_about = "Reconcile seqr exports into pedigree, phenotype, label, and group files"
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
    /// Export-related commands.
    Export(Export),
    /// Group assignment related commands.
    Groups(Groups),
}

/// Parsing of "export *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Export {
    /// The sub command to run
    #[command(subcommand)]
    command: ExportCommands,
}

/// Enum supporting the parsing of "export *" sub commands.
#[derive(Debug, Subcommand)]
enum ExportCommands {
    Pedigree(export::cli::PedigreeArgs),
    Labels(export::cli::LabelsArgs),
}

/// Parsing of "groups *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Groups {
    /// The sub command to run
    #[command(subcommand)]
    command: GroupsCommands,
}

/// Enum supporting the parsing of "groups *" sub commands.
#[derive(Debug, Subcommand)]
enum GroupsCommands {
    Assign(groups::cli::Args),
    History(groups::history::Args),
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
            Commands::Export(export) => match &export.command {
                ExportCommands::Pedigree(args) => export::cli::run_pedigree(&cli.common, args)?,
                ExportCommands::Labels(args) => export::cli::run_labels(&cli.common, args)?,
            },
            Commands::Groups(groups) => match &groups.command {
                GroupsCommands::Assign(args) => groups::cli::run(&cli.common, args)?,
                GroupsCommands::History(args) => groups::history::run(&cli.common, args)?,
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
