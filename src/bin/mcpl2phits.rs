use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mcpl_phits::{MarkerWidth, McplToPhitsOptions, mcpl_to_phits};

/// Converts the Monte Carlo particles in the input MCPL file to binary PHITS
/// dump file format.
///
/// The file can be read in PHITS using a configuration of (assuming the
/// filename is "phits.dmp"):
///
///     dump = 13
///     1 2 3 4 5 6 7 8 9 10 14 15 16
///     file = phits.dmp
///
/// or, when written with --nopol:
///
///     dump = 10
///     1 2 3 4 5 6 7 8 9 10
///     file = phits.dmp
#[derive(Parser)]
#[command(name = "mcpl2phits", version, verbatim_doc_comment)]
struct Cli {
    /// Do not write polarisation info (saving ~22% in file size)
    #[arg(short, long)]
    nopol: bool,

    /// Write Fortran records with 64 bit integer markers
    /// (the 32 bit default is almost always correct)
    #[arg(short = 'f')]
    fortran64: bool,

    /// Limit the number of particles transferred to the PHITS file (0 means no limit)
    #[arg(short = 'l', value_name = "LIMIT", default_value_t = 0)]
    limit: u64,

    /// MCPL file to convert (may be gzipped)
    input: PathBuf,

    /// PHITS dump file to create
    #[arg(default_value = "phits.dmp")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = McplToPhitsOptions {
        polarisation: !cli.nopol,
        limit: cli.limit,
        marker_width: if cli.fortran64 { MarkerWidth::Eight } else { MarkerWidth::Four },
    };
    let summary = mcpl_to_phits(&cli.input, &cli.output, &options)
        .with_context(|| format!("failed to convert {}", cli.input.display()))?;
    println!("Created {}", summary.output.display());
    Ok(())
}
