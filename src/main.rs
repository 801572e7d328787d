//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl crawler.

use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config};
use ripple_crawl::crawler::Coordinator;
use ripple_crawl::output::{generate_markdown_report, print_summary};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Ripple-Crawl: a bounded-concurrency web crawler
///
/// Starting from one seed URL, Ripple-Crawl follows every link it finds with a
/// fixed pool of workers, fetching each page exactly once, and prints a
/// summary when no work is left.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A bounded-concurrency web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Capacity of the result channel (defaults to the worker count)
    #[arg(long)]
    result_buffer: Option<usize>,

    /// Per-fetch timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Stop admitting new pages after this many have been submitted
    #[arg(long)]
    max_pages: Option<usize>,

    /// Only follow links on the seed's host
    #[arg(long)]
    same_host: bool,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
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

/// Loads configuration, runs the crawl and reports the outcome
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let seed = Url::parse(&cli.seed)?;
    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(format!("Seed URL must use http or https, got '{}'", seed.scheme()).into());
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let coordinator = Coordinator::from_config(seed.as_str(), &config)?;

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let report = coordinator.run().await?;

    if !cli.quiet {
        print_summary(&report);
    }

    let summary_path = cli
        .summary
        .clone()
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from));
    if let Some(path) = summary_path {
        write_summary(&report, &path)?;
    }

    // A failed seed exits non-zero with the seed's error
    report.into_result()?;
    Ok(())
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(result_buffer) = cli.result_buffer {
        config.crawler.result_buffer = Some(result_buffer);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.fetch_timeout_ms = Some(timeout_ms);
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if cli.same_host {
        config.crawler.same_host = true;
    }
}

fn write_summary(
    report: &ripple_crawl::CrawlReport,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    generate_markdown_report(report, path)?;
    tracing::info!("Summary written to: {}", path.display());
    Ok(())
}
