//! Run statistics
//!
//! This module provides the summary a crawl run reports when it finishes.

use crate::state::TraversalState;

/// Summary of a finished crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// The state the run ended in
    pub state: TraversalState,

    /// Number of records written to the sink
    pub pages_emitted: usize,

    /// Number of per-URL and per-link errors encountered
    pub errors: usize,

    /// Number of URLs claimed in the visited set (including the root)
    pub visited: usize,
}

impl CrawlSummary {
    /// Returns true if the run walked every reachable page
    pub fn is_complete(&self) -> bool {
        self.state == TraversalState::Exhausted
    }

    /// Number of claimed URLs that produced no record
    ///
    /// This counts failed fetches as well as work skipped because the run
    /// left the running state first.
    pub fn pages_without_output(&self) -> usize {
        self.visited.saturating_sub(self.pages_emitted)
    }
}

/// Logs a summary at info level
pub fn log_summary(summary: &CrawlSummary) {
    tracing::info!(
        "Crawl {}: {} pages emitted, {} visited, {} errors",
        summary.state,
        summary.pages_emitted,
        summary.visited,
        summary.errors
    );

    if summary.pages_without_output() > 0 {
        tracing::debug!(
            "{} visited URLs produced no output",
            summary.pages_without_output()
        );
    }
}
