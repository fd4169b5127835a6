//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts, redirects and content checks
//! - HTML parsing and asset/link extraction
//! - Bounded concurrent scheduling of work items
//! - Overall crawl coordination and shutdown

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlEngine, StopHandle};
pub use fetcher::{build_http_client, Document, FetchError, Fetcher, HttpFetcher};
pub use parser::{extract_assets, extract_links};
pub use scheduler::{WorkItem, WorkPool};

use crate::config::Config;
use crate::output::{CrawlSummary, ResultSink};
use crate::CrawlError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the HTTP client
/// 2. Walk every same-host page reachable from the root
/// 3. Stream one record per page into `sink`
///
/// Use [`CrawlEngine`] directly when the run needs to be stopped from
/// outside.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sink` - Destination for page records
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished
/// * `Err(CrawlError)` - The client could not be built or the sink failed
pub async fn crawl<S: ResultSink + 'static>(config: Config, sink: S) -> Result<CrawlSummary, CrawlError> {
    let fetcher = HttpFetcher::new().map_err(|e| {
        CrawlError::Fetch(FetchError::Http {
            url: config.root_url.clone(),
            source: e,
        })
    })?;
    CrawlEngine::new(config, fetcher).run(sink).await
}
