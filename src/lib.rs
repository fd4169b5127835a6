//! Hostwalk: a single-host breadth-first site mapper
//!
//! This crate walks every page reachable from a root URL without leaving the
//! root's host, and streams one JSON record per page listing the static assets
//! it references. Work fans out concurrently, every URL is visited at most once,
//! and the output stream is always closed cleanly, whether the walk runs out
//! of pages, halts on an error, or is stopped from outside.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Hostwalk operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed URL '{url}': {source}")]
    Malformed {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Not an http(s) URL: {0}")]
    InvalidScheme(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, StopHandle};
pub use output::{CrawlRecord, CrawlSummary, JsonStreamSink, ResultSink};
pub use state::{TraversalState, VisitedSet};
pub use url::{is_same_host, normalize_url};
