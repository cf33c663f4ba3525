//! Retriever worker: repeatedly pulls a URL, obeys robots and domain
//! delay, performs an HTTP GET, and deposits the response in the
//! unprocessed buffer. Ported from `original_source/retriever.py`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::time::sleep;

use crate::domain::registrable_domain;
use crate::monitor::{GlobalMonitor, ThreadState};
use crate::storage::{CrawledUrls, DomainTimers, RobotsCache, UnprocessedHtmlBuffer, UrlQueue};

pub struct Retriever {
    pub id: usize,
    client: Client,
    user_agent: String,
    http_timeout: Duration,
    idle_sleep: Duration,
    state: ThreadState,
    url_queue: Arc<UrlQueue>,
    crawled_urls: Arc<CrawledUrls>,
    unprocessed: Arc<UnprocessedHtmlBuffer>,
    domain_timers: Arc<DomainTimers>,
    robots: Arc<RobotsCache>,
    monitor: Arc<GlobalMonitor>,
}

impl Retriever {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        client: Client,
        user_agent: String,
        http_timeout: Duration,
        idle_sleep: Duration,
        url_queue: Arc<UrlQueue>,
        crawled_urls: Arc<CrawledUrls>,
        unprocessed: Arc<UnprocessedHtmlBuffer>,
        domain_timers: Arc<DomainTimers>,
        robots: Arc<RobotsCache>,
        monitor: Arc<GlobalMonitor>,
    ) -> Self {
        Self {
            id,
            client,
            user_agent,
            http_timeout,
            idle_sleep,
            state: ThreadState::Running,
            url_queue,
            crawled_urls,
            unprocessed,
            domain_timers,
            robots,
            monitor,
        }
    }

    fn name(&self) -> String {
        format!("Retriever#{}", self.id)
    }

    /// Runs the retriever's main loop until it stops.
    pub async fn run(&mut self) {
        let mut stop_rx = self.monitor.subscribe_stop();

        while self.state != ThreadState::Stopped {
            if *stop_rx.borrow() {
                self.stop("global stop requested").await;
                continue;
            }

            if self.crawled_urls.limit_reached().await {
                self.stop("crawl limit reached").await;
                continue;
            }

            let quiescent = self.url_queue.is_empty().await
                && self.unprocessed.is_empty().await
                && self.monitor.all_retrievers_idle_or_stopped().await
                && self.monitor.all_extractors_idle_or_stopped().await;
            if quiescent {
                self.stop("global quiescence").await;
                continue;
            }

            if self.url_queue.is_empty().await {
                self.idle("url queue empty").await;
                sleep(self.idle_sleep).await;
                continue;
            }

            self.continue_running().await;
            self.retrieve_one().await;
        }

        tracing::info!(retriever = %self.name(), "stopped");
    }

    /// Retrieves one URL and deposits it into the unprocessed buffer.
    /// Corresponds to one iteration of the spec's retriever main loop.
    async fn retrieve_one(&mut self) {
        let Some((url, is_seed)) = self.url_queue.get().await else {
            return;
        };

        tracing::info!(retriever = %self.name(), url, "starting fetch");

        // Commitment point against the budget: the check-and-insert is
        // one atomic operation, so concurrent retrievers can never push
        // the count past the budget, at the cost of counting failed
        // fetches.
        if !self.crawled_urls.try_add(url.clone()).await {
            tracing::debug!(retriever = %self.name(), url, "budget exhausted, dropping");
            return;
        }

        if !self.robots.can_fetch(&url).await {
            tracing::debug!(retriever = %self.name(), url, "robots.txt forbids access");
            return;
        }

        let Some(domain) = registrable_domain(&url) else {
            tracing::debug!(retriever = %self.name(), url, "could not derive registrable domain");
            return;
        };
        let crawl_delay = self.robots.crawl_delay(&url).await;
        let wait = self
            .domain_timers
            .time_until_next_request(&domain, crawl_delay)
            .await;
        if !wait.is_zero() {
            tracing::debug!(retriever = %self.name(), domain, wait_ms = wait.as_millis() as u64, "sleeping for politeness delay");
            sleep(wait).await;
        }

        let response = match self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, self.user_agent.clone())
            .timeout(self.http_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(retriever = %self.name(), url, error = %e, "error fetching URL");
                return;
            }
        };

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(retriever = %self.name(), url, error = %e, "error reading response body");
                return;
            }
        };

        self.domain_timers.set_timer(&domain).await;
        self.unprocessed.push(url, is_seed, body).await;
    }

    async fn continue_running(&mut self) {
        self.monitor.retriever_continue(self.state).await;
        self.state = ThreadState::Running;
    }

    async fn idle(&mut self, reason: &str) {
        tracing::debug!(retriever = %self.name(), reason, "idle");
        self.monitor.retriever_idle(self.state).await;
        self.state = ThreadState::Idle;
    }

    async fn stop(&mut self, reason: &str) {
        tracing::info!(retriever = %self.name(), reason, "stopping");
        self.monitor.retriever_stop(self.state).await;
        self.state = ThreadState::Stopped;
    }
}
