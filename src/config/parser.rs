use crate::config::types::{
    Config, CrawlerSettings, FileConfig, MalformedLinkPolicy, DEFAULT_TIMEOUT_MILLIS,
};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::time::Duration;
use url::Url;

impl Config {
    /// Creates a configuration for `root_url` with default settings
    ///
    /// A root without a scheme is treated as `http://`. Otherwise the root is
    /// kept as given, so its record carries the URL the user asked for; the
    /// engine deduplicates it by its canonical form.
    ///
    /// # Example
    ///
    /// ```
    /// use hostwalk::config::Config;
    ///
    /// let config = Config::new("www.example.org").unwrap();
    /// assert_eq!(config.root_url, "http://www.example.org");
    /// assert_eq!(config.host, "www.example.org");
    /// assert!(config.normalize_urls);
    /// ```
    pub fn new(root_url: &str) -> Result<Self, ConfigError> {
        let (root_url, host) = parse_root_url(root_url)?;

        Ok(Self {
            root_url,
            host,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MILLIS),
            print_errors: false,
            halt_on_error: false,
            normalize_urls: true,
            concurrency: Self::default_concurrency(),
            malformed_links: MalformedLinkPolicy::default(),
        })
    }

    /// Overwrites every field that `settings` sets
    pub fn apply(&mut self, settings: &CrawlerSettings) {
        if let Some(host) = &settings.host {
            self.host = host.to_lowercase();
        }
        if let Some(millis) = settings.timeout_millis {
            self.timeout = Duration::from_millis(millis);
        }
        if let Some(print_errors) = settings.print_errors {
            self.print_errors = print_errors;
        }
        if let Some(halt_on_error) = settings.halt_on_error {
            self.halt_on_error = halt_on_error;
        }
        if let Some(normalize_urls) = settings.normalize_urls {
            self.normalize_urls = normalize_urls;
        }
        if let Some(concurrency) = settings.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(escalate) = settings.escalate_malformed_links {
            self.malformed_links = MalformedLinkPolicy::from_escalate(escalate);
        }
    }
}

/// Parses a root URL, returning it with a scheme and its host
fn parse_root_url(raw: &str) -> Result<(String, String), ConfigError> {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidUrl(format!("'{}' has no host", raw)))?
        .to_string();

    Ok((with_scheme, host))
}

/// Loads a TOML config file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully parsed file
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file_config: FileConfig = toml::from_str(&content)?;
    Ok(file_config)
}

/// Builds and validates the configuration for a run
///
/// Settings are layered: defaults, then the config file (if any), then
/// `overrides` (the command line).
///
/// # Returns
///
/// * `Ok(Config)` - Successfully built and validated configuration
/// * `Err(ConfigError)` - Bad root URL, unreadable file, or failed validation
pub fn load_config(
    root_url: &str,
    file: Option<&Path>,
    overrides: &CrawlerSettings,
) -> Result<Config, ConfigError> {
    let mut config = Config::new(root_url)?;

    if let Some(path) = file {
        let file_config = load_file_config(path)?;
        config.apply(&file_config.crawler);
    }

    config.apply(overrides);

    validate(&config)?;

    Ok(config)
}
