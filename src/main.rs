//! CLI entry point for crf-prep.
//!
//! Provides command-line interface for:
//! - Converting configured dataset splits into training records
//! - Listing the record backends compiled into this build
//! - Inspecting the header of a written record
//!
//! # Usage
//!
//! Convert every configured split:
//! ```bash
//! crf_prep prepare --config config/prep.toml
//! ```
//!
//! Convert a single split:
//! ```bash
//! crf_prep prepare --split val
//! ```
//!
//! Inspect a record:
//! ```bash
//! crf_prep inspect out/val/1024x512/records/frankfurt_000000_000294.rec
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use crf_prep::config::Config;
use crf_prep::dataset;
use crf_prep::logging;
use crf_prep::record::factory::RecordWriterRegistry;
use crf_prep::record::writer::read_bin_header;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "crf_prep")]
#[command(about = "Piecewise-CRF training record preparation", long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config/prep.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert dataset splits into training records
    Prepare {
        /// Convert only this split instead of every configured one
        #[arg(long)]
        split: Option<String>,
    },

    /// List the record backends compiled into this build
    Formats,

    /// Print the header of a written bin record
    Inspect {
        /// Path to a .rec file
        record: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare { split } => prepare(&cli.config, split.as_deref()),
        Commands::Formats => formats(),
        Commands::Inspect { record } => inspect(&record),
    }
}

fn prepare(config_path: &Path, split: Option<&str>) -> Result<()> {
    let config = Config::load_from(config_path)?;
    config.validate()?;
    logging::init_from_config(&config).map_err(anyhow::Error::msg)?;

    tracing::info!(
        config = %config_path.display(),
        num_classes = config.labels.num_classes,
        subsample_factor = config.labels.subsample_factor,
        "Starting conversion"
    );

    let summaries = match split {
        Some(name) => vec![dataset::prepare_split(&config, name)?],
        None => dataset::prepare_all(&config)?,
    };

    let mut failed_total = 0;
    for summary in &summaries {
        println!(
            "{}: {} records written, {} images skipped",
            summary.split, summary.converted, summary.failed
        );
        failed_total += summary.failed;
    }
    if failed_total > 0 {
        tracing::warn!(failed_total, "Some images were skipped; see warnings above");
    }
    Ok(())
}

fn formats() -> Result<()> {
    for format in RecordWriterRegistry::new().list_formats() {
        println!("{format}");
    }
    Ok(())
}

fn inspect(record: &Path) -> Result<()> {
    let header = read_bin_header(record)?;
    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}
