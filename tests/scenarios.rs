//! End-to-end scenario tests against a mock HTTP server, mirroring the
//! seed scenarios from the design (budget enforcement, robots.txt
//! disallow, crawl-delay politeness, nofollow meta, and quiescence on a
//! dead host). Each test runs a full `supervisor::run` over a real
//! `tokio` runtime against `wiremock`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topical_crawler::classifier::{Classifier, StubClassifier};
use topical_crawler::config::CrawlerConfig;
use topical_crawler::supervisor;

fn seed_file(contents: &str) -> (NamedTempFile, PathBuf) {
    let mut file = NamedTempFile::new().expect("create temp seed file");
    file.write_all(contents.as_bytes()).expect("write seed file");
    file.flush().expect("flush seed file");
    let path = file.path().to_path_buf();
    (file, path)
}

fn base_config(seed_path: PathBuf) -> CrawlerConfig {
    let mut config = CrawlerConfig::default();
    config.seed_file = seed_path;
    config.blacklist_file = PathBuf::from("/no/such/blacklist.json");
    config.default_crawl_delay = Duration::from_millis(50);
    config.http_timeout = Duration::from_millis(500);
    config.idle_sleep = Duration::from_millis(20);
    config.num_retrievers = 2;
    config.num_extractors = 1;
    config
}

fn always_relevant_classifier() -> Arc<dyn Classifier> {
    Arc::new(StubClassifier::always_relevant("general"))
}

#[tokio::test]
async fn budget_stops_at_exactly_the_configured_limit() {
    let server = MockServer::start().await;

    let root_html = format!(
        r#"<html><body>
            <a href="{base}/b">b</a>
            <a href="{base}/c">c</a>
            <a href="{base}/d">d</a>
        </body></html>"#,
        base = server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(root_html))
        .mount(&server)
        .await;
    for leaf in ["/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(leaf))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
    }

    let (_guard, seed_path) = seed_file(&format!("{}/\n", server.uri()));
    let mut config = base_config(seed_path);
    config.crawl_limit = 3;

    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");

    assert_eq!(outcome.crawled_urls.len().await, 3);
}

#[tokio::test]
async fn robots_disallow_blocks_fetch_but_still_counts_against_crawled() {
    let server = MockServer::start().await;
    let base = server.uri();

    let start_html = format!(
        r#"<html><body>
            <a href="{base}/ok">ok</a>
            <a href="{base}/blocked">blocked</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /blocked\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string(start_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let (_guard, seed_path) = seed_file(&format!("{base}/start\n"));
    let mut config = base_config(seed_path);
    config.crawl_limit = 0;

    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");

    let crawled = outcome.crawled_urls.ordered().await;
    assert!(crawled.contains(&format!("{base}/start")));
    assert!(crawled.contains(&format!("{base}/ok")));
    assert!(crawled.contains(&format!("{base}/blocked")));

    let records = outcome.html_store.snapshot().await;
    assert!(records.iter().any(|r| r.url == format!("{base}/start")));
    assert!(records.iter().any(|r| r.url == format!("{base}/ok")));
    assert!(!records.iter().any(|r| r.url == format!("{base}/blocked")));
}

#[tokio::test]
async fn crawl_delay_from_robots_is_honored_between_same_domain_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();

    let root_html = format!(r#"<html><body><a href="{base}/b">b</a></body></html>"#);

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(root_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let (_guard, seed_path) = seed_file(&format!("{base}/\n"));
    let mut config = base_config(seed_path);
    config.crawl_limit = 0;

    let started = std::time::Instant::now();
    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");
    let elapsed = started.elapsed();

    assert_eq!(outcome.crawled_urls.len().await, 2);
    // Two fetches to the same domain, crawl-delay 1s apart: the whole
    // run cannot finish in less than one delay interval.
    assert!(elapsed >= Duration::from_secs(1));
}

#[tokio::test]
async fn nofollow_meta_tag_suppresses_link_extraction() {
    let server = MockServer::start().await;
    let base = server.uri();

    let html = format!(
        r#"<html><head><meta name="robots" content="nofollow"></head><body>
            <a href="{base}/a">a</a>
            <a href="{base}/b">b</a>
            <a href="{base}/c">c</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let (_guard, seed_path) = seed_file(&format!("{base}/\n"));
    let mut config = base_config(seed_path);
    config.crawl_limit = 0;

    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");

    assert_eq!(outcome.crawled_urls.len().await, 1);
    let records = outcome.html_store.snapshot().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].relevant);
    assert!(records[0].extracted_urls.is_empty());
}

#[tokio::test]
async fn dead_host_reaches_quiescence_with_nothing_stored() {
    let (_guard, seed_path) = seed_file("http://127.0.0.1:1/\n");
    let mut config = base_config(seed_path);
    config.crawl_limit = 0;
    config.http_timeout = Duration::from_millis(200);

    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");

    assert_eq!(outcome.crawled_urls.len().await, 1);
    assert_eq!(outcome.html_store.len().await, 0);
    assert!(outcome.unprocessed.is_empty().await);
}

#[tokio::test]
async fn relative_links_resolve_and_absolute_links_pass_through() {
    let server = MockServer::start().await;
    let base = server.uri();

    let html = format!(
        r#"<html><body>
            <a href="/d">abs-path</a>
            <a href="e.html">relative</a>
            <a href="#top">anchor</a>
            <a href="mailto:x@y.test">mail</a>
            <a href="{base}/abs/full">already-absolute</a>
        </body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/a/b/c.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    for leaf in ["/d", "/a/b/e.html", "/abs/full"] {
        Mock::given(method("GET"))
            .and(path(leaf))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
    }

    let (_guard, seed_path) = seed_file(&format!("{base}/a/b/c.html\n"));
    let mut config = base_config(seed_path);
    config.crawl_limit = 0;

    let outcome = supervisor::run(config, always_relevant_classifier())
        .await
        .expect("crawl run succeeds");

    let records = outcome.html_store.snapshot().await;
    let root_record = records
        .iter()
        .find(|r| r.url == format!("{base}/a/b/c.html"))
        .expect("root page recorded");

    assert!(root_record.extracted_urls.contains(&format!("{base}/d")));
    assert!(root_record
        .extracted_urls
        .contains(&format!("{base}/a/b/e.html")));
    assert!(root_record
        .extracted_urls
        .contains(&format!("{base}/abs/full")));
    assert_eq!(root_record.extracted_urls.len(), 3);
}
