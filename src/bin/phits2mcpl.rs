use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mcpl_phits::{PhitsToMcplOptions, phits_to_mcpl};

/// Converts the Monte Carlo particles in the input dump file (binary PHITS dump
/// file format in suitable configuration) to MCPL format and stores them in the
/// designated output file.
#[derive(Parser)]
#[command(name = "phits2mcpl", version)]
struct Cli {
    /// Enable double-precision storage of floating point values
    #[arg(short, long)]
    double: bool,

    /// Do not attempt to gzip output file
    #[arg(short, long)]
    nogzip: bool,

    /// Embed entire configuration FILE (the input deck) used to produce
    /// dumpfile in the MCPL header
    #[arg(short = 'c', value_name = "FILE")]
    input_deck: Option<PathBuf>,

    /// Embed into the MCPL header the dump summary text FILE, which was
    /// produced along with the dumpfile itself
    #[arg(short = 's', value_name = "FILE")]
    dump_summary: Option<PathBuf>,

    /// Limit the number of particles transferred to the MCPL file (0 means no limit)
    #[arg(short = 'l', value_name = "LIMIT", default_value_t = 0)]
    limit: u64,

    /// Binary PHITS dump file (may be gzipped)
    dumpfile: PathBuf,

    /// MCPL file to create
    #[arg(default_value = "output.mcpl")]
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
    let options = PhitsToMcplOptions {
        double_precision: cli.double,
        gzip: !cli.nogzip,
        input_deck: cli.input_deck,
        dump_summary: cli.dump_summary,
        limit: cli.limit,
    };
    let summary = phits_to_mcpl(&cli.dumpfile, &cli.output, &options)
        .with_context(|| format!("failed to convert {}", cli.dumpfile.display()))?;
    println!("Created {}", summary.output.display());
    Ok(())
}
