//! ZeroXplorer main entry point
//!
//! This is the command-line interface for the ZeroXplorer crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroxplorer::config::{load_config_with_hash, validate, Config};
use zeroxplorer::crawler::Coordinator;
use zeroxplorer::output::{print_statistics, JsonReportWriter, OutputHandler};

/// ZeroXplorer: a single-domain reconnaissance crawler
///
/// ZeroXplorer visits every page reachable from the seed URL without leaving
/// its host, and collects emails, links, referenced files, scripts, form
/// fields, media and comments into one JSON report.
#[derive(Parser, Debug)]
#[command(name = "zeroxplorer")]
#[command(version)]
#[command(about = "A single-domain reconnaissance crawler", long_about = None)]
struct Cli {
    /// Seed URL; its host bounds the crawl
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report path (overrides the configuration file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum number of concurrent fetches (overrides the configuration file)
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Write the report as single-line JSON
    #[arg(long)]
    compact: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    let coordinator = Coordinator::with_http_fetcher(&cli.seed, config.clone())
        .with_context(|| format!("Cannot start crawl from '{}'", cli.seed))?;

    // Ctrl-C stops dispatch; whatever was collected is still written out
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            cancel.cancel();
        }
    });

    let result = coordinator.run().await.context("Crawl failed")?;

    let writer = JsonReportWriter::from_config(&config.output);
    writer
        .write_report(&result.report)
        .with_context(|| format!("Failed to write report to {}", writer.destination()))?;

    if !cli.quiet {
        print_statistics(&result.statistics, &result.report);
        println!("\nReport: {}", writer.destination());
    }

    Ok(())
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(output) = &cli.output {
        config.output.report_path = output.display().to_string();
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if cli.compact {
        config.output.pretty = false;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("zeroxplorer=info,warn"),
            1 => EnvFilter::new("zeroxplorer=debug,info"),
            2 => EnvFilter::new("zeroxplorer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
