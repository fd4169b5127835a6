use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from a URL string
///
/// The `url` crate lowercases registered domain names while parsing, so the
/// returned host is already in canonical form. Ports are not part of the host.
///
/// # Returns
///
/// * `Ok(Some(String))` - The host of the URL
/// * `Ok(None)` - The URL parsed but has no host (e.g. `mailto:`)
/// * `Err(UrlError::Malformed)` - The string is not a URL
///
/// # Examples
///
/// ```
/// use hostwalk::url::extract_host;
///
/// let host = extract_host("https://WWW.Example.org:8080/path").unwrap();
/// assert_eq!(host, Some("www.example.org".to_string()));
/// ```
pub fn extract_host(url: &str) -> UrlResult<Option<String>> {
    Ok(parse(url)?.host_str().map(str::to_string))
}

/// Checks whether a URL belongs to the given host
///
/// Only the host component is compared, so `http` and `https` links to the
/// same host both match. Subdomains do not match their parent domain.
/// Anything that is not an `http` or `https` URL (`tel:`, `mailto:`,
/// `javascript:`) cannot be crawled and is reported as an error.
///
/// # Arguments
///
/// * `url` - The candidate URL
/// * `host` - The configured host (lowercase)
///
/// # Returns
///
/// * `Ok(true)` - The URL's host equals `host`
/// * `Ok(false)` - Different host
/// * `Err(UrlError::Malformed)` - The URL cannot be parsed
/// * `Err(UrlError::InvalidScheme)` - The URL is not http(s)
pub fn is_same_host(url: &str, host: &str) -> UrlResult<bool> {
    let parsed = parse(url)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(url.to_string()));
    }

    Ok(parsed.host_str().is_some_and(|h| h == host))
}

fn parse(url: &str) -> UrlResult<Url> {
    Url::parse(url).map_err(|source| UrlError::Malformed {
        url: url.to_string(),
        source,
    })
}
