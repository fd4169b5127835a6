//! Output module for streaming crawl results
//!
//! This module handles:
//! - The `ResultSink` lifecycle contract (setup, output, teardown)
//! - Streaming records as a JSON array
//! - Scoped sink sessions that always tear down
//! - The end-of-run summary

mod json;
mod session;
pub mod stats;
mod traits;

pub use json::JsonStreamSink;
pub use session::{SinkHandle, SinkSession};
pub use stats::{log_summary, CrawlSummary};
pub use traits::{CrawlRecord, OutputError, OutputResult, ResultSink};
