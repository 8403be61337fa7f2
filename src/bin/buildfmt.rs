//! buildfmt CLI binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use buildfmt::cli::{run, FmtError, Outcome};

/// Canonical formatter for BUILD files.
#[derive(Parser)]
#[command(name = "buildfmt")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files to rewrite in place; `-` reads stdin and writes stdout.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report files that would change, without rewriting anything.
    /// Exits 4 if any file is not already formatted.
    #[arg(long)]
    check: bool,

    /// Refuse embedded Python blocks (strict BUILD dialect).
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.files, cli.check, cli.strict) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Changed) => ExitCode::from(4),
        Err(FmtError::Parse(diagnostic)) => {
            eprintln!("{}", diagnostic);
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("buildfmt: {}", err);
            ExitCode::from(1)
        }
    }
}
