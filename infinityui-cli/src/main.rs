//! InfinityUI CLI - inspect and dry-run interface overrides
//!
//! `plan` lists what a surface load would pick up from the override tree;
//! `apply` runs a full patch session against a JSON scene snapshot.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use commands::apply::ApplyArgs;
use commands::plan::PlanArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "infinityui")]
#[command(version, about = "Inspect and dry-run InfinityUI interface overrides")]
struct Cli {
    /// Configuration file (InfinityUI.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Game directory containing Data/Interface
    #[arg(long, global = true)]
    game_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the overrides a surface load would apply
    Plan(PlanArgs),

    /// Patch a scene snapshot as if its surface had just loaded
    Apply(ApplyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = commands::common::load_config(cli.config.as_ref(), cli.game_dir.as_ref())?;
    if cli.verbose {
        config.logging.level = LevelFilter::DEBUG;
    }

    let _guard = infinityui::logging::init(&config.logging)?;

    match cli.command {
        Commands::Plan(args) => commands::plan::run(args, config),
        Commands::Apply(args) => commands::apply::run(args, config),
    }
}
