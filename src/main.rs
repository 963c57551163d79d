//! depsight - NuGet dependency inventory, check and update CLI
//!
//! Commands:
//! - `scan`: list projects, parameter files and package references
//! - `check`: look up the latest version of every package
//! - `update`: pin outdated references to their latest version

use clap::Parser;
use depsight::cli::CliArgs;
use depsight::logging;
use depsight::orchestrator::Orchestrator;
use depsight::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose, args.quiet);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depsight v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path().display());
        if args.is_dry_run() {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(args.clone())?;
    let result = orchestrator.run().await?;

    let output_config =
        OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.is_dry_run());
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::from(result.exit_code()))
}
