use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// Size at which an existing log file is rotated before a run appends to it
const LOG_ROTATE_BYTES: u64 = 10 * 1024 * 1024;
/// Rotated files kept as `<name>.1` (newest) to `<name>.5`
const LOG_BACKUPS: usize = 5;

#[derive(Parser)]
#[command(
    name = "biolitminer",
    about = "BioLitMiner - Biomedical Literature Mining Tool",
    long_about = "Search PubMed for biomedical articles and show or save their metadata"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write log records to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PubMed for biomedical articles
    Search(Box<commands::search::Search>),
    /// Show BioLitMiner version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Search(cmd) => cmd.execute().await,
        Commands::Version => {
            commands::version::execute();
            Ok(())
        }
    }
}

/// Install the tracing subscriber
///
/// Log lines go to stderr through the indicatif layer so they do not tear
/// the spinners. Without `--verbose` only warnings from the client are
/// shown, while the CLI's own spans still drive the spinners.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        "debug"
    } else {
        "warn,biolitminer::commands=info"
    };

    let indicatif_layer = IndicatifLayer::new();

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path, LOG_ROTATE_BYTES, LOG_BACKUPS)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(file_layer)
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    Ok(())
}

/// Open `path` for appending, shifting it to `<path>.1` first once it has
/// reached `max_bytes`
fn open_log_file(path: &Path, max_bytes: u64, backups: usize) -> Result<File> {
    let full = fs::metadata(path).is_ok_and(|m| m.len() >= max_bytes);
    if full && backups > 0 {
        let backup = |n: usize| PathBuf::from(format!("{}.{n}", path.display()));
        for n in (1..backups).rev() {
            let from = backup(n);
            if from.exists() {
                fs::rename(&from, backup(n + 1))
                    .with_context(|| format!("Failed to rotate {}", from.display()))?;
            }
        }
        fs::rename(path, backup(1))
            .with_context(|| format!("Failed to rotate log file {}", path.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
