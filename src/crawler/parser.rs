//! HTML parser for extracting assets and links
//!
//! This module handles parsing fetched documents to extract:
//! - Static assets (anything with a `src`, plus stylesheets and icons)
//! - Hyperlinks to follow (from `<a>` tags)

use crate::crawler::fetcher::Document;
use scraper::{Html, Selector};
use url::Url;

/// Extracts the static assets of a document
///
/// 1. Every element with a `src` attribute (`img`, `script`, `iframe`,
///    `source`, ...)
/// 2. Every `<link href>` whose `rel` mentions `icon` or `stylesheet`
///    (case-insensitive, so `shortcut icon` and `apple-touch-icon` count)
///
/// References resolve against the first `<base href>` if there is one,
/// otherwise against the document URL. Only `http` and `https` assets are
/// kept; inline `data:` sources and empty attributes are dropped.
///
/// # Example
///
/// ```
/// use hostwalk::crawler::{extract_assets, Document};
///
/// let html = r#"<html><head><link rel="stylesheet" href="/style.css"></head>
///               <body><img src="data:image/png;base64,AAAA"></body></html>"#;
/// let doc = Document::from_html("https://www.example.org", html).unwrap();
/// assert_eq!(extract_assets(&doc), vec!["https://www.example.org/style.css"]);
/// ```
pub fn extract_assets(doc: &Document) -> Vec<String> {
    let document = Html::parse_document(&doc.body);
    let base = document_base(&document, &doc.url);
    collect_assets(&document, &base)
}

/// Extracts the hyperlinks of a document
///
/// Every `<a href>`, resolved like assets. Fragment-only hrefs are kept: `#`
/// resolves to the page itself followed by `#`, which URL normalization may
/// then collapse. Absolute references with other schemes (`tel:`,
/// `mailto:`, `javascript:`) are returned as written; deciding what to do
/// with them is up to the caller. Empty and unresolvable references are
/// dropped.
///
/// # Example
///
/// ```
/// use hostwalk::crawler::{extract_links, Document};
///
/// let html = r#"<a href="/about">About</a><a href="tel:+39123456789">Call</a>"#;
/// let doc = Document::from_html("https://www.example.org", html).unwrap();
/// assert_eq!(
///     extract_links(&doc),
///     vec!["https://www.example.org/about", "tel:+39123456789"]
/// );
/// ```
pub fn extract_links(doc: &Document) -> Vec<String> {
    let document = Html::parse_document(&doc.body);
    let base = document_base(&document, &doc.url);
    collect_links(&document, &base)
}

/// Returns the URL relative references resolve against
fn document_base(document: &Html, url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return url.clone();
    };

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| url.join(href.trim()).ok())
        .unwrap_or_else(|| url.clone())
}

fn collect_assets(document: &Html, base: &Url) -> Vec<String> {
    let mut assets = Vec::new();

    // Media and scripts
    if let Ok(src_selector) = Selector::parse("[src]") {
        for element in document.select(&src_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("src")
                .and_then(|src| resolve_web_reference(src, base))
            {
                assets.push(absolute_url);
            }
        }
    }

    // Stylesheets and icons
    if let Ok(link_selector) = Selector::parse("link[href][rel]") {
        for element in document.select(&link_selector) {
            let rel = element.value().attr("rel").unwrap_or("").to_lowercase();
            if !(rel.contains("icon") || rel.contains("stylesheet")) {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_web_reference(href, base))
            {
                assets.push(absolute_url);
            }
        }
    }

    assets
}

fn collect_links(document: &Html, base: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_reference(href, base))
            {
                links.push(absolute_url.to_string());
            }
        }
    }

    links
}

/// Resolves a reference to an absolute URL of any scheme
///
/// Returns None for empty references and references that fail to resolve.
fn resolve_reference(reference: &str, base: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return None;
    }

    base.join(reference).ok()
}

/// Resolves a reference to an absolute HTTP(S) URL
fn resolve_web_reference(reference: &str, base: &Url) -> Option<String> {
    resolve_reference(reference, base)
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
}
