//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! HTTP fetcher and JSON sink through the full crawl cycle end-to-end.

use hostwalk::config::Config;
use hostwalk::crawler::{CrawlEngine, FetchError, Fetcher, HttpFetcher};
use hostwalk::{CrawlSummary, JsonStreamSink, TraversalState};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writer whose contents stay readable after the sink is moved into the engine
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("output must be UTF-8")
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.text()).expect("output must be well-formed JSON")
    }

    /// Record URLs, sorted so concurrent runs compare deterministically
    fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .json()
            .as_array()
            .expect("output must be an array")
            .iter()
            .map(|r| r["url"].as_str().unwrap().to_string())
            .collect();
        urls.sort();
        urls
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, at: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, at: &str, status: u16, to: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).insert_header("location", to))
        .mount(server)
        .await;
}

/// Runs the engine with the real HTTP fetcher
async fn crawl(config: Config) -> (CrawlSummary, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let fetcher = HttpFetcher::new().expect("Failed to build client");
    let summary = CrawlEngine::new(config, fetcher)
        .run(JsonStreamSink::new(buffer.clone()))
        .await
        .expect("Crawl failed");
    (summary, buffer)
}

fn config_for(url: &str) -> Config {
    let mut config = Config::new(url).expect("Failed to build config");
    config.timeout = Duration::from_secs(2);
    config
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title>
        <link rel="stylesheet" href="/style.css">
        <link rel="shortcut icon" href="/favicon.ico">
        </head><body>
        <img src="/logo.png">
        <a href="/page1">Page 1</a>
        <a href="page2">Page 2</a>
        <a href="tel:+15555550100">Call us</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/page2?">Page 2</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/page2",
        r#"<html><body><script src="/app.js"></script><a href="/page1#">Page 1</a></body></html>"#,
    )
    .await;

    let (summary, buffer) = crawl(config_for(&base)).await;

    assert_eq!(
        buffer.urls(),
        vec![
            base.clone(),
            format!("{}/page1", base),
            format!("{}/page2", base),
        ]
    );

    let records = buffer.json();
    let root = records
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["url"] == base)
        .unwrap();
    assert_eq!(
        root["assets"],
        serde_json::json!([
            format!("{}/logo.png", base),
            format!("{}/style.css", base),
            format!("{}/favicon.ico", base),
        ])
    );

    assert_eq!(summary.state, TraversalState::Exhausted);
    assert_eq!(summary.pages_emitted, 3);
    // The tel: link cannot be crawled and is counted, but does not halt
    assert_eq!(summary.errors, 1);
}

#[tokio::test]
async fn test_error_status_codes_emit_nothing() {
    for status in [400u16, 404, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let (summary, buffer) = crawl(config_for(&server.uri())).await;

        assert_eq!(buffer.json(), serde_json::json!([]), "status {}", status);
        assert_eq!(summary.errors, 1, "status {}", status);
    }
}

#[tokio::test]
async fn test_fetch_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let result = fetcher
        .get_page(&format!("{}/missing", server.uri()), Duration::from_secs(2))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let result = fetcher
        .get_page(&server.uri(), Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));

    let mut config = config_for(&server.uri());
    config.timeout = Duration::from_millis(100);
    let (summary, buffer) = crawl(config).await;

    assert_eq!(buffer.json(), serde_json::json!([]));
    assert_eq!(summary.errors, 1);
}

#[tokio::test]
async fn test_redirects_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/moved">Moved</a><a href="/found">Found</a></body></html>"#,
    )
    .await;
    mount_redirect(&server, "/moved", 301, "/new-home").await;
    mount_redirect(&server, "/found", 302, "/elsewhere/").await;
    mount_page(&server, "/new-home", r#"<html><body><img src="a.png"></body></html>"#).await;
    mount_page(&server, "/elsewhere/", r#"<html><body><img src="b.png"></body></html>"#).await;

    let (summary, buffer) = crawl(config_for(&base)).await;

    assert_eq!(summary.errors, 0);
    assert_eq!(
        buffer.urls(),
        vec![
            base.clone(),
            format!("{}/found", base),
            format!("{}/moved", base),
        ]
    );

    // Assets resolve against the page the redirect landed on
    let records = buffer.json();
    let assets: Vec<_> = records
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|r| r["assets"].as_array().unwrap().clone())
        .collect();
    assert!(assets.contains(&serde_json::json!(format!("{}/a.png", base))));
    assert!(assets.contains(&serde_json::json!(format!("{}/elsewhere/b.png", base))));
}

#[tokio::test]
async fn test_redirect_loop() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/loop", 302, "/loop").await;

    let fetcher = HttpFetcher::new().unwrap();
    let result = fetcher
        .get_page(&format!("{}/loop", server.uri()), Duration::from_secs(2))
        .await;
    assert!(matches!(result, Err(FetchError::RedirectLimit { .. })));

    let (summary, buffer) = crawl(config_for(&format!("{}/loop", server.uri()))).await;
    assert_eq!(buffer.json(), serde_json::json!([]));
    assert_eq!(summary.errors, 1);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/image.png">Image</a><a href="/page">Page</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/page", "<html><body>Text</body></html>").await;

    let (summary, buffer) = crawl(config_for(&base)).await;

    assert_eq!(buffer.urls(), vec![base.clone(), format!("{}/page", base)]);
    assert_eq!(summary.errors, 1);
}

#[tokio::test]
async fn test_cross_host_link_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body>
        <a href="http://forum.example.org/">Forum</a>
        <a href="/products">Products</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/products", "<html><body>Products</body></html>").await;

    let (summary, buffer) = crawl(config_for(&base)).await;

    assert_eq!(
        buffer.urls(),
        vec![base.clone(), format!("{}/products", base)]
    );
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.visited, 2);
}

#[tokio::test]
async fn test_halt_on_error_stops_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/broken">Broken</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = config_for(&base);
    config.halt_on_error = true;
    let (summary, buffer) = crawl(config).await;

    assert_eq!(summary.state, TraversalState::HaltedOnError);
    assert_eq!(buffer.urls(), vec![base.clone()]);
    // The stream is still closed
    assert!(buffer.text().trim_end().ends_with(']'));
}

#[tokio::test]
async fn test_one_shot_crawl_entry_point() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/docs">Docs</a><a href="/docs#intro">Intro</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/docs", r#"<html><body><img src="/diagram.svg"></body></html>"#).await;

    let buffer = SharedBuffer::default();
    let summary = hostwalk::crawler::crawl(config_for(&base), JsonStreamSink::new(buffer.clone()))
        .await
        .expect("Crawl failed");

    assert!(summary.is_complete());
    assert_eq!(
        buffer.urls(),
        vec![
            base.clone(),
            format!("{}/docs", base),
            format!("{}/docs#intro", base),
        ]
    );
}
