//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Fetcher` trait the engine drives
//! - Building the HTTP client with a user agent and redirect limit
//! - GET requests with per-call timeouts and a body size cap
//! - Error classification

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed for one fetch
pub const MAX_REDIRECTS: usize = 20;

/// Bodies are truncated to this many bytes
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// User agent sent with every request
const USER_AGENT: &str = concat!("hostwalk/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Unsupported content type '{content_type}' for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },
}

/// A fetched HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// URL the body was served from (after redirects); relative references
    /// resolve against it
    pub url: Url,

    /// The HTML source
    pub body: String,
}

impl Document {
    /// Creates a document served from `url`
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Creates a document from a URL string
    ///
    /// # Example
    ///
    /// ```
    /// use hostwalk::crawler::Document;
    ///
    /// let doc = Document::from_html("https://www.example.org", "<html></html>").unwrap();
    /// assert_eq!(doc.url.as_str(), "https://www.example.org/");
    /// ```
    pub fn from_html(url: &str, body: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?, body))
    }
}

/// Source of HTML documents
///
/// The engine calls `get_page` once per visited URL. Implementations follow
/// redirects themselves and report any failure (network, timeout, redirect
/// limit, HTTP status) as a [`FetchError`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the document at `url`, giving up after `timeout`
    async fn get_page(&self, url: &str, timeout: Duration) -> Result<Document, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client()?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL with full error handling
    ///
    /// # Error Mapping
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout (connect or read) | `Timeout` |
    /// | More than 20 redirects | `RedirectLimit` |
    /// | Non-2xx final status | `Status` |
    /// | Content-Type neither `text/*` nor XML | `UnsupportedContentType` |
    /// | Anything else from the client | `Http` |
    ///
    /// A missing Content-Type header is accepted as HTML.
    async fn get_page(&self, url: &str, timeout: Duration) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html_content_type(content_type) {
                return Err(FetchError::UnsupportedContentType {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let final_url = response.url().clone();
        let body = read_body(response, url).await?;

        Ok(Document::new(final_url, body))
    }
}

/// Returns true for content types a HTML parser can make sense of
fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.starts_with("text/") || content_type.contains("xml")
}

/// Reads the response body, truncating it at [`MAX_BODY_BYTES`]
async fn read_body(mut response: Response, url: &str) -> Result<String, FetchError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(url, e))? {
        let remaining = MAX_BODY_BYTES - bytes.len();
        if chunk.len() >= remaining {
            bytes.extend_from_slice(&chunk[..remaining]);
            tracing::debug!("Truncated body of {} at {} bytes", url, MAX_BODY_BYTES);
            break;
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Maps a client error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_redirect() {
        FetchError::RedirectLimit {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        match Url::parse(url) {
            Err(source) => FetchError::InvalidUrl {
                url: url.to_string(),
                source,
            },
            Ok(_) => FetchError::Http {
                url: url.to_string(),
                source: error,
            },
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("hostwalk/"));
        assert!(USER_AGENT.len() > "hostwalk/".len());
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(is_html_content_type("application/xml"));

        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("application/octet-stream"));
    }

    #[test]
    fn test_document_from_html() {
        let doc = Document::from_html("https://www.example.org/about", "<p>hi</p>").unwrap();
        assert_eq!(doc.url.as_str(), "https://www.example.org/about");
        assert_eq!(doc.body, "<p>hi</p>");
    }

    #[test]
    fn test_document_from_invalid_url() {
        assert!(Document::from_html("not a url", "").is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher
            .get_page("not a url", Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    // Behavior against live responses is covered with wiremock in the
    // integration tests
}
