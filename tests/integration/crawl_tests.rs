//! Integration tests for the crawler
//!
//! Most tests drive the coordinator through a counting in-memory fetcher so
//! fetch attempts can be asserted exactly. The last group runs the real
//! `HttpFetcher` against wiremock servers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroxplorer::config::Config;
use zeroxplorer::crawler::{Coordinator, FetchError, Fetcher, Response};
use zeroxplorer::output::{ArtifactKind, JsonReportWriter, OutputHandler};
use zeroxplorer::{CrawlReport, ZeroxError};

/// In-memory site that counts every fetch attempt per URL
#[derive(Default)]
struct CountingFetcher {
    pages: HashMap<String, (Option<&'static str>, String)>,
    failing: Vec<String>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl CountingFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn html(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), (Some("text/html"), body.to_string()));
        self
    }

    fn binary(mut self, url: &str, content_type: &'static str) -> Self {
        self.pages
            .insert(url.to_string(), (Some(content_type), String::new()));
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn fetched_host(&self, host: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .keys()
            .any(|url| Url::parse(url).unwrap().host_str() == Some(host))
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.iter().any(|u| u == url.as_str()) {
            return Err(FetchError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }

        match self.pages.get(url.as_str()) {
            Some((content_type, body)) => Ok(Response::new(url.clone(), *content_type, body.as_str())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

async fn crawl_with(seed: &str, fetcher: Arc<CountingFetcher>) -> zeroxplorer::CrawlResult {
    Coordinator::new(seed, Config::default(), fetcher)
        .expect("coordinator should build")
        .run()
        .await
        .expect("crawl should finish")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_end_to_end_single_host() {
    let fetcher = Arc::new(
        CountingFetcher::new()
            .html(
                "http://ex.test/",
                r#"<html><body>
                    <a href="http://ex.test/p2">two</a>
                    <a href="http://other.test/">elsewhere</a>
                    <script src="/a.js"></script>
                    <!-- hi -->
                </body></html>"#,
            )
            .html("http://ex.test/p2", "<p>second page</p>"),
    );

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(
        result.report.links,
        strings(&["http://ex.test/p2", "http://other.test/"])
    );
    assert_eq!(result.report.js_files, strings(&["http://ex.test/a.js"]));
    assert_eq!(result.report.comments, strings(&["<!-- hi -->"]));
    assert_eq!(fetcher.calls("http://ex.test/p2"), 1);
    assert!(!fetcher.fetched_host("other.test"));
}

#[tokio::test]
async fn test_each_url_fetched_at_most_once() {
    // Every page links to every other page, including itself
    let nav = r#"<a href="/">home</a><a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#;
    let fetcher = Arc::new(
        CountingFetcher::new()
            .html("http://ex.test/", nav)
            .html("http://ex.test/a", nav)
            .html("http://ex.test/b", nav)
            .html("http://ex.test/c", nav),
    );

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    for page in ["/", "/a", "/b", "/c"] {
        assert_eq!(fetcher.calls(&format!("http://ex.test{}", page)), 1, "{}", page);
    }
    assert_eq!(fetcher.total_calls(), 4);
    assert_eq!(result.statistics.fetches_dispatched, 4);
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let fetcher = Arc::new(
        CountingFetcher::new()
            .html(
                "http://ex.test/",
                r##"<a href="/doc#a">a</a><a href="/doc#b">b</a><a href="/doc">plain</a>"##,
            )
            .html("http://ex.test/doc", "<p>doc</p>"),
    );

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(fetcher.calls("http://ex.test/doc"), 1);
    assert_eq!(fetcher.total_calls(), 2);
    // The recorded links keep their fragments
    assert!(result.report.contains(ArtifactKind::Links, "http://ex.test/doc#a"));
    assert!(result.report.contains(ArtifactKind::Links, "http://ex.test/doc#b"));
}

#[tokio::test]
async fn test_off_host_links_recorded_not_fetched() {
    let fetcher = Arc::new(CountingFetcher::new().html(
        "http://ex.test/",
        r#"<a href="https://cdn.other.test/lib">cdn</a><a href="http://sub.ex.test/">sub</a>"#,
    ));

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(fetcher.total_calls(), 1);
    assert!(result
        .report
        .contains(ArtifactKind::Links, "https://cdn.other.test/lib"));
    assert!(result.report.contains(ArtifactKind::Links, "http://sub.ex.test/"));
}

#[tokio::test]
async fn test_mailto_updates_emails_only() {
    let fetcher = Arc::new(CountingFetcher::new().html(
        "http://ex.test/",
        r#"<p>Write to a@b.com</p><a href="mailto:a@b.com">mail</a>"#,
    ));

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(result.report.emails, strings(&["a@b.com"]));
    assert!(result.report.links.is_empty());
    assert_eq!(fetcher.total_calls(), 1);
    assert_eq!(result.statistics.urls_enqueued, 1);
}

#[tokio::test]
async fn test_opaque_response_only_touches_external_files() {
    let fetcher = Arc::new(
        CountingFetcher::new()
            .html("http://ex.test/", r#"<a href="/logo">logo</a>"#)
            .binary("http://ex.test/logo", "image/png"),
    );

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(
        result.report.external_files,
        strings(&["http://ex.test/logo"])
    );
    assert_eq!(result.report.links, strings(&["http://ex.test/logo"]));
    assert!(result.report.images.is_empty());
    assert_eq!(result.statistics.opaque_resources, 1);
    assert_eq!(result.report.total(), 2);
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_traversal() {
    let fetcher = Arc::new(
        CountingFetcher::new()
            .html(
                "http://ex.test/",
                r#"<a href="/down">down</a><a href="/missing">missing</a><a href="/up">up</a>"#,
            )
            .html("http://ex.test/up", "<p>contact: ops@ex.test</p>")
            .failing("http://ex.test/down"),
    );

    let result = crawl_with("http://ex.test/", Arc::clone(&fetcher)).await;

    assert_eq!(result.statistics.fetch_failures, 2);
    assert_eq!(result.statistics.pages_extracted, 2);
    assert_eq!(result.report.emails, strings(&["ops@ex.test"]));
    assert_eq!(fetcher.calls("http://ex.test/down"), 1);
}

#[tokio::test]
async fn test_cancellation_yields_partial_report() {
    let mut fetcher = CountingFetcher::new().with_delay(Duration::from_millis(50));
    let mut seed_body = String::from("<!-- seed -->");
    for i in 0..50 {
        let url = format!("http://ex.test/p{}", i);
        seed_body.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
        fetcher = fetcher.html(&url, &format!("<!-- page {} -->", i));
    }
    let fetcher = Arc::new(fetcher.html("http://ex.test/", &seed_body));

    let mut config = Config::default();
    config.crawler.max_concurrent_fetches = 2;
    let coordinator =
        Coordinator::new("http://ex.test/", config, Arc::clone(&fetcher) as Arc<dyn Fetcher>)
            .unwrap();
    let cancel = coordinator.cancellation_token();

    let handle = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(120)).await;
    cancel.cancel();

    let result = handle.await.unwrap().unwrap();

    assert!(result.statistics.cancelled);
    assert!(fetcher.total_calls() < 51);
    assert_eq!(fetcher.total_calls() as u64, result.statistics.fetches_dispatched);
    assert!(result.report.contains(ArtifactKind::Comments, "<!-- seed -->"));
    // Every dispatched page finished and was merged before finalizing
    assert_eq!(
        result.report.comments.len() as u64,
        result.statistics.pages_extracted
    );
}

#[tokio::test]
async fn test_invalid_seed_fails_before_fetch() {
    let fetcher = Arc::new(CountingFetcher::new());

    for seed in ["not a url", "ftp://ex.test/", "/relative/path", "mailto:a@b.com"] {
        let result = Coordinator::new(seed, Config::default(), Arc::clone(&fetcher) as Arc<dyn Fetcher>);
        assert!(
            matches!(result, Err(ZeroxError::Config(_))),
            "seed {:?} should be rejected",
            seed
        );
    }
    assert_eq!(fetcher.total_calls(), 0);
}

#[tokio::test]
async fn test_report_written_as_json() {
    let fetcher = Arc::new(CountingFetcher::new().html(
        "http://ex.test/",
        r#"<form><input name="q"></form><img src="/i.png">"#,
    ));
    let result = crawl_with("http://ex.test/", fetcher).await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("zeroxer.json");
    JsonReportWriter::new(&report_path, true)
        .write_report(&result.report)
        .unwrap();

    let content = std::fs::read_to_string(&report_path).unwrap();
    let parsed: CrawlReport = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, result.report);
    assert_eq!(parsed.form_fields, strings(&["q"]));
    assert_eq!(parsed.images, strings(&["http://ex.test/i.png"]));
}

#[tokio::test]
async fn test_http_fetcher_full_crawl() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body>
                <a href="/about">About</a>
                <a href="/brochure.pdf">Brochure</a>
                <a href="/gone">Gone</a>
                <a href="https://external.test/">External</a>
                <p>info@ex.test</p>
            </body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/">home</a><video><source src="/intro.mp4"></video>"#,
            "text/html; charset=utf-8",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Coordinator::with_http_fetcher(&format!("{}/", base), Config::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    let brochure = format!("{}/brochure.pdf", base);
    assert_eq!(result.report.external_files, vec![brochure]);
    assert_eq!(result.report.emails, strings(&["info@ex.test"]));
    assert_eq!(result.report.videos, vec![format!("{}/intro.mp4", base)]);
    assert!(result
        .report
        .contains(ArtifactKind::Links, "https://external.test/"));
    assert_eq!(result.statistics.fetch_failures, 1);
    assert_eq!(result.statistics.pages_extracted, 2);
    assert_eq!(result.statistics.opaque_resources, 1);
    // `.expect(1)` on each mock is verified when the server drops
}

#[tokio::test]
async fn test_http_fetcher_follows_redirect_within_host() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/home", base).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<script src="app.js"></script>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let result = Coordinator::with_http_fetcher(&format!("{}/", base), Config::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    // Relative references resolve against the final URL
    assert_eq!(result.report.js_files, vec![format!("{}/app.js", base)]);
}

/// Number of requests the server received for `request_path`
async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_http_fetcher_does_not_follow_off_host_redirect() {
    let seed_server = MockServer::start().await;
    let foreign_server = MockServer::start().await;
    let base = seed_server.uri();

    // Same machine, different host name: 127.0.0.1 vs localhost
    let foreign = format!("http://localhost:{}/evil", foreign_server.address().port());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"<a href="/go">go</a>"#, "text/html"))
        .mount(&seed_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", foreign.as_str()))
        .expect(1)
        .mount(&seed_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/evil"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<p>offhost@evil.test</p><!-- offhost -->",
            "text/html",
        ))
        .expect(0)
        .mount(&foreign_server)
        .await;

    let result = Coordinator::with_http_fetcher(&format!("{}/", base), Config::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(requests_to(&foreign_server, "/evil").await, 0);
    assert!(result.report.emails.is_empty());
    assert!(result.report.comments.is_empty());
    assert_eq!(result.report.links, vec![format!("{}/go", base)]);
    assert_eq!(result.statistics.redirects_skipped, 1);
}

#[tokio::test]
async fn test_http_fetcher_redirect_targets_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let target = format!("{}/c", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/x">x</a><a href="/y">y</a><a href="/c">c</a>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    for from in ["/x", "/y"] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<!-- c -->", "text/html"))
        .mount(&mock_server)
        .await;

    let result = Coordinator::with_http_fetcher(&format!("{}/", base), Config::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(requests_to(&mock_server, "/c").await, 1);
    assert_eq!(result.report.comments, strings(&["<!-- c -->"]));
    assert_eq!(result.statistics.redirects_skipped, 2);
}

#[tokio::test]
async fn test_redirect_chain_into_unlinked_page_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let target = format!("{}/landing", base);

    // Nothing links /landing directly; the first hop claims it
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/r1">1</a><a href="/r2">2</a>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    for from in ["/r1", "/r2"] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", target.as_str()))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>landing</p>", "text/html"))
        .mount(&mock_server)
        .await;

    let result = Coordinator::with_http_fetcher(&format!("{}/", base), Config::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(requests_to(&mock_server, "/landing").await, 1);
    assert_eq!(result.statistics.pages_extracted, 2);
    assert_eq!(result.statistics.redirects_skipped, 1);
}
