//! Wires the shared stores and worker pools together, starts the crawl,
//! awaits completion, and serializes final state. Ported from
//! `original_source/main.py`.

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

use crate::blacklist::Blacklist;
use crate::classifier::Classifier;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Result};
use crate::extractor::Extractor;
use crate::monitor::GlobalMonitor;
use crate::retriever::Retriever;
use crate::storage::{
    CrawledUrls, DomainTimers, HtmlStore, RobotsCache, UnprocessedHtmlBuffer, UrlMap, UrlQueue,
};

/// Counts reported to the user at shutdown: crawled, unprocessed
/// (leftover), stored, and relevant page counts.
#[derive(Debug, Clone, Copy)]
pub struct CrawlSummary {
    pub crawled: usize,
    pub unprocessed: usize,
    pub stored: usize,
    pub relevant: usize,
}

/// Everything the supervisor built, handed back so a caller can
/// serialize it or inspect it further (e.g. in tests).
pub struct CrawlOutcome {
    pub summary: CrawlSummary,
    pub crawled_urls: Arc<CrawledUrls>,
    pub unprocessed: Arc<UnprocessedHtmlBuffer>,
    pub html_store: Arc<HtmlStore>,
    pub url_map: Arc<UrlMap>,
    pub robots: Arc<RobotsCache>,
}

/// Loads the newline-separated seed file: blank lines ignored, trailing
/// newline stripped.
pub fn load_seed_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|source| CrawlError::SeedFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Runs a full crawl to completion: loads seeds and the blacklist,
/// constructs the shared stores, starts `config.num_retrievers`
/// retrievers and `config.num_extractors` extractors, and awaits their
/// completion.
///
/// `classifier` must already have had [`Classifier::load_parameters`]
/// called successfully -- a missing/invalid classifier configuration is
/// fatal at startup per the spec, and is surfaced by the caller before
/// this function is ever invoked.
pub async fn run(config: CrawlerConfig, classifier: Arc<dyn Classifier>) -> Result<CrawlOutcome> {
    let seeds = load_seed_file(&config.seed_file)?;
    let blacklist = Arc::new(Blacklist::load(&config.blacklist_file)?);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .expect("reqwest client configuration is valid");

    let url_queue = Arc::new(UrlQueue::new());
    url_queue.seed(seeds).await;

    let crawled_urls = Arc::new(CrawledUrls::new(config.crawl_limit));
    let domain_timers = Arc::new(DomainTimers::new());
    let robots = Arc::new(RobotsCache::new(
        client.clone(),
        config.user_agent.clone(),
        config.default_crawl_delay,
    ));
    let unprocessed = Arc::new(UnprocessedHtmlBuffer::new());
    let html_store = Arc::new(HtmlStore::new());
    let url_map = Arc::new(UrlMap::new());
    let monitor = Arc::new(GlobalMonitor::new(config.num_retrievers, config.num_extractors));

    let mut handles = Vec::new();

    for id in 0..config.num_retrievers {
        let mut retriever = Retriever::new(
            id,
            client.clone(),
            config.user_agent.clone(),
            config.http_timeout,
            config.idle_sleep,
            url_queue.clone(),
            crawled_urls.clone(),
            unprocessed.clone(),
            domain_timers.clone(),
            robots.clone(),
            monitor.clone(),
        );
        handles.push(tokio::spawn(async move { retriever.run().await }));
    }

    for id in 0..config.num_extractors {
        let mut extractor = Extractor::new(
            id,
            config.idle_sleep,
            classifier.clone(),
            blacklist.clone(),
            html_store.clone(),
            unprocessed.clone(),
            url_queue.clone(),
            crawled_urls.clone(),
            url_map.clone(),
            monitor.clone(),
        );
        handles.push(tokio::spawn(async move { extractor.run().await }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    html_store.sort_by_relevance().await;

    let summary = CrawlSummary {
        crawled: crawled_urls.len().await,
        unprocessed: unprocessed.len().await,
        stored: html_store.len().await,
        relevant: html_store.relevant_urls().await.len(),
    };

    tracing::info!(
        crawled = summary.crawled,
        unprocessed = summary.unprocessed,
        stored = summary.stored,
        relevant = summary.relevant,
        "crawl finished"
    );

    Ok(CrawlOutcome {
        summary,
        crawled_urls,
        unprocessed,
        html_store,
        url_map,
        robots,
    })
}

#[derive(Serialize)]
struct UnprocessedRecord {
    url: String,
    is_seed: bool,
    #[serde(rename = "html document")]
    html: String,
}

/// Writes the six output files described in the spec, all under
/// `output_dir`, named `<prefix>_<name>`.
pub async fn write_outputs(
    output_dir: &Path,
    prefix: &str,
    outcome: &CrawlOutcome,
) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|source| CrawlError::OutputWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    write_json(
        output_dir,
        prefix,
        "html_database.json",
        &outcome.html_store.snapshot().await,
    )?;

    let leftovers: Vec<UnprocessedRecord> = {
        let mut records = Vec::new();
        while let Some(page) = outcome.unprocessed.pop().await {
            records.push(UnprocessedRecord {
                url: page.url,
                is_seed: page.is_seed,
                html: page.html,
            });
        }
        records
    };
    write_json(
        output_dir,
        prefix,
        "unprocessed_html_database.json",
        &leftovers,
    )?;

    write_json(
        output_dir,
        prefix,
        "crawled_urls.json",
        &outcome.crawled_urls.ordered().await,
    )?;

    write_json(output_dir, prefix, "url_map.json", &outcome.url_map.edges().await)?;

    write_json(
        output_dir,
        prefix,
        "robotstxt.json",
        &outcome.robots.fetched_hosts().await,
    )?;

    let relevant_csv = outcome
        .html_store
        .relevant_urls()
        .await
        .into_iter()
        .map(|(url, category)| format!("{url},{category}"))
        .collect::<Vec<_>>()
        .join("\n");
    let csv_path = output_dir.join(format!("{prefix}_relevant_urls.csv"));
    std::fs::write(&csv_path, relevant_csv).map_err(|source| CrawlError::OutputWrite {
        path: csv_path,
        source,
    })?;

    Ok(())
}

fn write_json<T: Serialize>(
    output_dir: &Path,
    prefix: &str,
    name: &str,
    value: &T,
) -> Result<()> {
    let path = output_dir.join(format!("{prefix}_{name}"));
    let json = serde_json::to_string(value).expect("value is always representable as JSON");
    std::fs::write(&path, json).map_err(|source| CrawlError::OutputWrite { path, source })
}

/// The UTC `YYYYMMDD_HHMMSS` output filename prefix.
pub fn timestamp_prefix(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}
