use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default per-fetch timeout
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 5_000;

/// What a malformed discovered link does to a halt-on-error run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinkPolicy {
    /// Treat it like a failed fetch: with halt-on-error, the run halts
    #[default]
    Escalate,
    /// Drop it and keep going, even with halt-on-error
    Drop,
}

impl MalformedLinkPolicy {
    /// Maps the boolean form used by flags and config files
    pub fn from_escalate(escalate: bool) -> Self {
        if escalate {
            Self::Escalate
        } else {
            Self::Drop
        }
    }
}

/// Main configuration structure for Hostwalk
///
/// Built once before a run and shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Starting URL, in the canonical form produced by the `url` crate
    pub root_url: String,

    /// Host links must match to be followed
    pub host: String,

    /// Per-fetch timeout
    pub timeout: Duration,

    /// Print per-URL errors to the diagnostic channel
    pub print_errors: bool,

    /// Stop dispatching work after the first error
    pub halt_on_error: bool,

    /// Strip trailing `#`/`?` before visiting
    pub normalize_urls: bool,

    /// Maximum number of fetches in flight
    pub concurrency: usize,

    /// Whether malformed links count as errors for halt-on-error
    pub malformed_links: MalformedLinkPolicy,
}

impl Config {
    /// Default concurrency: the number of available CPUs
    pub fn default_concurrency() -> usize {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}

/// Optional crawler settings
///
/// Both the `[crawler]` table of a config file and the command line produce
/// one of these; unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerSettings {
    /// Host override
    pub host: Option<String>,

    /// Per-fetch timeout in milliseconds
    #[serde(rename = "timeout-millis")]
    pub timeout_millis: Option<u64>,

    #[serde(rename = "print-errors")]
    pub print_errors: Option<bool>,

    #[serde(rename = "halt-on-error")]
    pub halt_on_error: Option<bool>,

    #[serde(rename = "normalize-urls")]
    pub normalize_urls: Option<bool>,

    pub concurrency: Option<usize>,

    #[serde(rename = "escalate-malformed-links")]
    pub escalate_malformed_links: Option<bool>,
}

/// Structure of a TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerSettings,
}
