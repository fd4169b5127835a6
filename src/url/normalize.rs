use url::Url;

/// Characters stripped from the end of a URL during normalization
const TERMINATORS: &[char] = &['#', '?'];

/// Normalizes a URL according to Hostwalk's normalization rule
///
/// A URL that ends with an empty fragment (`#`) or an empty query (`?`) names
/// the same resource as the URL without it, so the terminator is removed.
/// A run of terminators (`/a#?`) is removed as a whole, which keeps the
/// function idempotent. The result is never shorter than one character, and
/// nothing else about the URL is touched: this is a string rule, not a parse.
///
/// When `enabled` is false the input is returned unchanged.
///
/// # Examples
///
/// ```
/// use hostwalk::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/a#", true), "https://example.com/a");
/// assert_eq!(normalize_url("https://example.com/a?", true), "https://example.com/a");
/// assert_eq!(normalize_url("https://example.com/a#", false), "https://example.com/a#");
/// ```
pub fn normalize_url(url: &str, enabled: bool) -> String {
    if !enabled {
        return url.to_string();
    }

    let trimmed = url.trim_end_matches(TERMINATORS);
    if trimmed.is_empty() {
        // Keep a single character, matching the length > 1 guard
        return url.chars().next().map(String::from).unwrap_or_default();
    }

    trimmed.to_string()
}

/// Returns the form the `url` crate serializes `url` to
///
/// Links found on pages are already in this form, so claiming a
/// user-supplied URL under its canonical form lets later links to it
/// deduplicate. Input that does not parse is returned unchanged.
///
/// # Examples
///
/// ```
/// use hostwalk::url::canonical_url;
///
/// assert_eq!(canonical_url("https://WWW.Example.org"), "https://www.example.org/");
/// assert_eq!(canonical_url("https://www.example.org/#"), "https://www.example.org/#");
/// ```
pub fn canonical_url(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}
