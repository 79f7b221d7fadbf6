//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the Catalog-Crawler product harvester.

use anyhow::Context;
use catalog_crawler::config::{load_config_with_hash, validate, Config};
use catalog_crawler::crawler::{crawl, TaskKind};
use catalog_crawler::output::{export_records, print_statistics, timestamped_path};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: a concurrent product catalog harvester
///
/// Crawls a storefront from a seed page through its categories to every
/// product and colour variation, then writes all product records to a
/// timestamped CSV file.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent product catalog harvester", long_about = None)]
struct Cli {
    /// URL to start crawling from (defaults to the configured seed)
    #[arg(value_name = "SEED")]
    seed: Option<String>,

    /// How the seed URL is processed
    #[arg(short, long, value_enum)]
    kind: Option<TaskKind>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the CSV export
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

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

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    let outcome = crawl(&config).await.context("Crawl failed")?;
    println!("Scraping completed!");

    let path = timestamped_path(
        Path::new(&config.output.directory),
        &config.output.file_prefix,
        &chrono::Local::now(),
    );
    let exported = export_records(&outcome.records, &path, config.output.delimiter as u8)
        .with_context(|| format!("Error writing to CSV {}", path.display()))?;
    if exported > 0 {
        println!("Data successfully exported to the file {}", path.display());
    } else {
        println!("Empty data array. Nothing to export.");
    }

    println!();
    print_statistics(&outcome.statistics, outcome.elapsed);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
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

/// Loads the optional config file and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(kind) = cli.kind {
        config.crawler.seed_kind = kind;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }

    validate(&config).context("Invalid settings")?;

    tracing::info!(
        "Seed: {} ({}), workers: {}",
        config.crawler.seed_url,
        config.crawler.seed_kind,
        config.crawler.workers
    );
    Ok(config)
}
