//! Extractor worker: classifies pages, parses out links, filters them
//! (validity + blacklist + nofollow), writes to the HTML store, and
//! feeds new links back to the URL queue. Ported from
//! `original_source/extractor.py`.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use scraper::{Html, Selector};
use tokio::time::sleep;

use crate::blacklist::Blacklist;
use crate::classifier::Classifier;
use crate::domain::{is_valid, relative_to_absolute};
use crate::monitor::{GlobalMonitor, ThreadState};
use crate::storage::{CrawledUrls, HtmlRecord, HtmlStore, UnprocessedHtmlBuffer, UrlMap, UrlQueue};

pub struct Extractor {
    pub id: usize,
    idle_sleep: Duration,
    state: ThreadState,
    classifier: Arc<dyn Classifier>,
    blacklist: Arc<Blacklist>,
    html_store: Arc<HtmlStore>,
    unprocessed: Arc<UnprocessedHtmlBuffer>,
    url_queue: Arc<UrlQueue>,
    crawled_urls: Arc<CrawledUrls>,
    url_map: Arc<UrlMap>,
    monitor: Arc<GlobalMonitor>,
}

impl Extractor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        idle_sleep: Duration,
        classifier: Arc<dyn Classifier>,
        blacklist: Arc<Blacklist>,
        html_store: Arc<HtmlStore>,
        unprocessed: Arc<UnprocessedHtmlBuffer>,
        url_queue: Arc<UrlQueue>,
        crawled_urls: Arc<CrawledUrls>,
        url_map: Arc<UrlMap>,
        monitor: Arc<GlobalMonitor>,
    ) -> Self {
        Self {
            id,
            idle_sleep,
            state: ThreadState::Running,
            classifier,
            blacklist,
            html_store,
            unprocessed,
            url_queue,
            crawled_urls,
            url_map,
            monitor,
        }
    }

    fn name(&self) -> String {
        format!("Extractor#{}", self.id)
    }

    pub async fn run(&mut self) {
        let mut stop_rx = self.monitor.subscribe_stop();

        while self.state != ThreadState::Stopped {
            if *stop_rx.borrow() {
                self.stop("global stop requested").await;
                continue;
            }

            let retrievers_done = self.monitor.all_retrievers_idle_or_stopped().await;

            if self.crawled_urls.limit_reached().await
                && self.unprocessed.is_empty().await
                && retrievers_done
            {
                self.stop("crawl limit reached").await;
                continue;
            }

            let quiescent = self.url_queue.is_empty().await
                && self.unprocessed.is_empty().await
                && retrievers_done
                && self.monitor.all_extractors_idle_or_stopped().await;
            if quiescent {
                self.stop("global quiescence").await;
                continue;
            }

            if self.unprocessed.is_empty().await {
                self.idle("unprocessed buffer empty").await;
                sleep(self.idle_sleep).await;
                continue;
            }

            self.continue_running().await;
            self.extract_one().await;
        }

        tracing::info!(extractor = %self.name(), "stopped");
    }

    /// Processes one unprocessed page: classify, detect nofollow,
    /// extract and filter links, store the result.
    async fn extract_one(&mut self) {
        let Some(page) = self.unprocessed.pop().await else {
            return;
        };

        tracing::info!(extractor = %self.name(), url = %page.url, "processing");

        let document = Html::parse_document(&page.html);
        let classification = self.classifier.classify(&page.url, &page.html);
        let nofollow = nofollow_tag_present(&document);

        let should_extract = (classification.relevant || page.is_seed) && !nofollow;

        let extracted_urls = if should_extract {
            self.extract_urls(&document, &page.url)
        } else {
            Vec::new()
        };

        let record = HtmlRecord::new(
            page.url.clone(),
            page.html,
            extracted_urls.clone(),
            classification,
        );
        self.html_store.add(record).await;

        if extracted_urls.is_empty() {
            return;
        }

        for extracted in &extracted_urls {
            self.url_map
                .add_edge(page.url.clone(), extracted.clone())
                .await;
        }

        if !self.crawled_urls.limit_reached().await {
            for extracted in extracted_urls {
                if !self.crawled_urls.contains(&extracted).await {
                    self.url_queue.put(extracted, false).await;
                }
            }
        }
    }

    /// Extracts, validates, resolves, and de-duplicates the `<a href>`
    /// targets of a page, dropping anything blacklisted.
    fn extract_urls(&self, document: &Html, page_url: &str) -> Vec<String> {
        let selector = Selector::parse("a").expect("static selector is valid");

        let hrefs: Vec<String> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .filter(|href| !href.starts_with('#'))
            .filter(|href| match href.split_once(':') {
                Some((scheme, _)) if is_probable_scheme(scheme) => {
                    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
                }
                _ => true,
            })
            .collect();

        let mut seen = IndexSet::new();

        for href in hrefs {
            let candidate = if is_valid(&href) {
                href
            } else {
                match relative_to_absolute(&href, page_url) {
                    Some(resolved) if is_valid(&resolved) => resolved,
                    _ => continue,
                }
            };

            if self.blacklist.matches(&candidate) {
                continue;
            }

            seen.insert(candidate);
        }

        seen.into_iter().collect()
    }

    async fn continue_running(&mut self) {
        self.monitor.extractor_continue(self.state).await;
        self.state = ThreadState::Running;
    }

    async fn idle(&mut self, reason: &str) {
        tracing::debug!(extractor = %self.name(), reason, "idle");
        self.monitor.extractor_idle(self.state).await;
        self.state = ThreadState::Idle;
    }

    async fn stop(&mut self, reason: &str) {
        tracing::info!(extractor = %self.name(), reason, "stopping");
        self.monitor.extractor_stop(self.state).await;
        self.state = ThreadState::Stopped;
    }
}

/// A href's leading segment looks like a URI scheme if it is a short run
/// of letters immediately followed by `:` (so `http:`, `mailto:`, and
/// `javascript:` count, but `2024:` or a Windows-style path do not).
fn is_probable_scheme(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphabetic())
}

/// Checks for a `<meta name="robots" content="...">` tag with a
/// `nofollow` or `none` token (comma-separated, case-insensitive,
/// trimmed).
fn nofollow_tag_present(document: &Html) -> bool {
    let selector = Selector::parse(r#"meta[name="robots" i]"#)
        .or_else(|_| Selector::parse("meta[name=robots]"))
        .expect("static selector is valid");

    document.select(&selector).any(|el| {
        el.value()
            .attr("content")
            .map(|content| {
                content
                    .split(',')
                    .map(|token| token.trim().to_ascii_lowercase())
                    .any(|token| token == "nofollow" || token == "none")
            })
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_nofollow_meta_tag() {
        let html = r#"<html><head><meta name="robots" content="noindex,nofollow"></head></html>"#;
        let document = Html::parse_document(html);
        assert!(nofollow_tag_present(&document));
    }

    #[test]
    fn follow_meta_tag_is_not_nofollow() {
        let html = r#"<html><head><meta name="robots" content="follow"></head></html>"#;
        let document = Html::parse_document(html);
        assert!(!nofollow_tag_present(&document));
    }

    #[test]
    fn no_meta_tag_is_not_nofollow() {
        let html = "<html><head></head><body>hi</body></html>";
        let document = Html::parse_document(html);
        assert!(!nofollow_tag_present(&document));
    }
}
