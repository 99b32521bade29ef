use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use log::info;

use posture_capture::config::AppConfig;
use posture_capture::dataset::combine_files;
use posture_capture::logger;

#[derive(Parser)]
#[command(name = "posture-combine")]
#[command(about = "Merge labeled posture CSVs into one shuffled dataset")]
struct Cli {
    /// TOML config file; defaults to posture.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// File the combined dataset is written to
    #[arg(long)]
    output: Option<String>,

    /// Seed for the row shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Capture files to merge; defaults to the configured posture set
    inputs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::init_logger();

    let cli = Cli::parse();

    let mut config =
        AppConfig::load_or_default(cli.config.as_deref()).context("failed to load configuration")?;

    if !cli.inputs.is_empty() {
        config.combine.inputs = cli.inputs;
    }
    if let Some(output) = cli.output {
        config.combine.output = output;
    }
    if let Some(seed) = cli.seed {
        config.combine.seed = seed;
    }
    config.validate()?;

    let summary = combine_files(&config.combine)?;

    info!(
        "Data has been combined and shuffled successfully ({} rows from {} files into {})",
        summary.rows_out,
        summary.files_read,
        summary.output.display()
    );
    Ok(())
}
