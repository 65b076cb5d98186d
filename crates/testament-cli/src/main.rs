//! # testament CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use testament_cli::outline::{run_outline, OutlineArgs};
use testament_cli::steps::{run_steps, StepsArgs};
use testament_cli::validate::{run_validate, ValidateArgs};

/// Will drafting toolkit.
///
/// Validates draft files with the same rules the wizard applies, prints
/// step plans, and renders will outlines.
#[derive(Parser, Debug)]
#[command(name = "testament", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a draft file, or one step of it.
    Validate(ValidateArgs),

    /// Validate a draft file and render its will outline.
    Outline(OutlineArgs),

    /// Print the step plan for a will type.
    Steps(StepsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Outline(args) => run_outline(&args),
        Commands::Steps(args) => run_steps(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
