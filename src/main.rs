//! Hostwalk main entry point
//!
//! This is the command-line interface for the Hostwalk site mapper. Page
//! records go to stdout as a JSON array; logs and errors go to stderr.

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use hostwalk::config::{load_config, CrawlerSettings};
use hostwalk::crawler::{CrawlEngine, HttpFetcher};
use hostwalk::{CrawlError, JsonStreamSink};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Hostwalk: a single-host site mapper
///
/// Hostwalk walks every page reachable from a root URL without leaving the
/// root's host, and prints one JSON record per page listing the static
/// assets it references.
#[derive(Parser, Debug)]
#[command(name = "hostwalk")]
#[command(version)]
#[command(about = "A single-host site mapper", long_about = None)]
struct Cli {
    /// Root URL to start from (http:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    root_url: String,

    /// Per-fetch timeout in milliseconds [default: 5000]
    #[arg(long, value_name = "MILLIS")]
    timeout_millis: Option<u64>,

    /// Print per-URL errors to stderr [default: false]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    print_errors: Option<bool>,

    /// Stop after the first error [default: false]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    halt_on_error: Option<bool>,

    /// Strip trailing '#' and '?' from URLs before visiting [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    normalize_urls: Option<bool>,

    /// Maximum number of fetches in flight [default: number of CPUs]
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Host that links must match (defaults to the root URL's host)
    #[arg(long)]
    host: Option<String>,

    /// Treat malformed links as errors for --halt-on-error [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    escalate_malformed_links: Option<bool>,

    /// Path to a TOML file with a [crawler] table of defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level for stderr output (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Collects the flags that override config file values
    fn overrides(&self) -> CrawlerSettings {
        CrawlerSettings {
            host: self.host.clone(),
            timeout_millis: self.timeout_millis,
            print_errors: self.print_errors,
            halt_on_error: self.halt_on_error,
            normalize_urls: self.normalize_urls,
            concurrency: self.concurrency,
            escalate_malformed_links: self.escalate_malformed_links,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&cli.log_level);

    match handle_crawl(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber on stderr
fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the main crawl operation
async fn handle_crawl(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.root_url, cli.config.as_deref(), &cli.overrides())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing::info!(
        "Crawling {} (timeout {}ms, halt on error {}, normalize {})",
        config.root_url,
        config.timeout.as_millis(),
        config.halt_on_error,
        config.normalize_urls
    );

    let fetcher = HttpFetcher::new()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let engine = CrawlEngine::new(config, fetcher);
    let stop = engine.stop_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    match engine.run(JsonStreamSink::new(std::io::stdout())).await {
        Ok(summary) => {
            tracing::info!("Crawl finished: {}", summary.state);
            Ok(())
        }
        Err(CrawlError::Output(e)) => Err(anyhow::anyhow!("Output failed, results are incomplete: {}", e)),
        Err(e) => Err(e.into()),
    }
}
