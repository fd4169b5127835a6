//! Configuration module for Hostwalk
//!
//! A [`Config`] is built from the root URL, optionally layered with a TOML
//! file, then with command-line overrides, and validated before a run.
//!
//! # Example
//!
//! ```no_run
//! use hostwalk::config::{load_config, CrawlerSettings};
//! use std::path::Path;
//!
//! let config = load_config(
//!     "https://www.example.org",
//!     Some(Path::new("hostwalk.toml")),
//!     &CrawlerSettings::default(),
//! )
//! .unwrap();
//! println!("Crawler will use {} workers", config.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerSettings, FileConfig, MalformedLinkPolicy, DEFAULT_TIMEOUT_MILLIS};

// Re-export parser functions
pub use parser::{load_config, load_file_config};
pub use validation::validate;
