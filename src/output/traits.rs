//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks and the record
//! type they emit.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output used out of order: {0}")]
    Lifecycle(&'static str),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One visited page and the static assets it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRecord {
    /// The URL that was fetched
    pub url: String,

    /// Absolute asset URLs, in document order
    pub assets: Vec<String>,
}

impl CrawlRecord {
    /// Creates a record
    pub fn new(url: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            url: url.into(),
            assets,
        }
    }
}

/// Trait for result sinks
///
/// A sink is driven through `setup` → any number of `output` → `teardown`,
/// once per run. The engine serializes calls, so implementations do not need
/// their own locking, but each `output` call must leave the stream holding
/// complete records only.
pub trait ResultSink: Send {
    /// Opens the stream and writes any leading structure
    fn setup(&mut self) -> OutputResult<()>;

    /// Writes one record
    ///
    /// # Arguments
    ///
    /// * `record` - The page and its assets
    fn output(&mut self, record: &CrawlRecord) -> OutputResult<()>;

    /// Writes any closing structure, then flushes and releases the stream
    ///
    /// Must be safe to call after a failed `setup`.
    fn teardown(&mut self) -> OutputResult<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn setup(&mut self) -> OutputResult<()> {
        (**self).setup()
    }

    fn output(&mut self, record: &CrawlRecord) -> OutputResult<()> {
        (**self).output(record)
    }

    fn teardown(&mut self) -> OutputResult<()> {
        (**self).teardown()
    }
}
