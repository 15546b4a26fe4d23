use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use notescan::{PatternRegistry, Result, ScanConfig, corpus, merge};

/// Screen a partitioned corpus of clinical notes for probable AUD mentions
#[derive(Parser)]
#[command(name = "notescan", version, about)]
struct Cli {
    /// CSV keyword source with Root and Regex columns
    #[arg(long)]
    keywords: PathBuf,

    /// Directory tree with one subdirectory of Parquet batch files per partition
    #[arg(long)]
    notes_dir: PathBuf,

    /// Directory for intermediate partition results and the final table
    #[arg(long)]
    output_dir: PathBuf,

    /// File name of the merged final table, created inside the output directory
    #[arg(long, default_value = "aud_notes_keywords.parquet")]
    final_name: String,

    /// Process partitions without merging (e.g. while resuming in stages)
    #[arg(long)]
    skip_merge: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        // Partition failures are non-fatal but distinguished in the exit status.
        Ok(true) => ExitCode::from(2),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    // Scanning is CPU-bound; size the pool to physical cores.
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get_physical())
        .build_global()
    {
        warn!("Failed to configure the rayon thread pool: {e}");
    }

    let registry = PatternRegistry::from_csv(&cli.keywords)?;
    let config = ScanConfig {
        show_progress: !cli.no_progress,
        ..ScanConfig::default()
    };

    let intermediate_dir = cli.output_dir.join("intermediate_keywords");
    info!(
        "Intermediate results will be saved to {} (interrupted runs resume there)",
        intermediate_dir.display()
    );

    let report = corpus::run(&cli.notes_dir, &registry, &config, &intermediate_dir)?;
    report.log_summary();

    if cli.skip_merge {
        info!("Skipping merge step");
    } else {
        let final_path = cli.output_dir.join(&cli.final_name);
        let summary = merge::merge(&intermediate_dir, &final_path)?;
        summary.log_summary();
    }

    Ok(report.has_failures())
}
