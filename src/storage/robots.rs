//! Robots.txt cache. Ported from `original_source/storage.py:
//! RobotsTXTDatabase`, reusing the `robotstxt` crate's `DefaultMatcher`
//! the way the teacher crate already does in `Crawler::crawl`, plus a
//! line-scan for the `Crawl-delay` directive (the `robotstxt` crate does
//! not expose crawl-delay parsing, so this follows the teacher's own
//! `Crawl-delay`-line-scan rather than pulling in another dependency).

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use robotstxt::DefaultMatcher;
use tokio::sync::Mutex;

use crate::domain::ParsedUrl;

struct RobotsEntry {
    content: String,
    crawl_delay: Option<Duration>,
}

/// `None` for a host means "no usable robots.txt" (fetch failure,
/// non-200, or nothing parseable) -- treated as permissive. Presence of
/// the key (`Some` or `None`) suppresses re-fetching.
pub struct RobotsCache {
    client: Client,
    user_agent: String,
    default_crawl_delay: Duration,
    entries: Mutex<HashMap<String, Option<RobotsEntry>>>,
}

impl RobotsCache {
    pub fn new(client: Client, user_agent: String, default_crawl_delay: Duration) -> Self {
        Self {
            client,
            user_agent,
            default_crawl_delay,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The robots.txt URL for `url`'s host, using `url`'s own scheme.
    fn robots_url(parsed: &ParsedUrl) -> String {
        format!("{}://{}/robots.txt", parsed.scheme, parsed.authority)
    }

    /// Ensures an entry exists for `url`'s host, fetching robots.txt if
    /// necessary. The network request happens outside the cache lock;
    /// concurrent callers for the same host may redundantly fetch, but
    /// the result is idempotent ("last write wins" per the design's
    /// concurrency model).
    async fn ensure_entry(&self, url: &str) -> Option<()> {
        let parsed = ParsedUrl::parse(url)?;
        let host = parsed.authority.clone();

        {
            let guard = self.entries.lock().await;
            if guard.contains_key(&host) {
                return Some(());
            }
        }

        let robots_url = Self::robots_url(&parsed);
        let fetched = self.fetch(&robots_url).await;

        let mut guard = self.entries.lock().await;
        guard.entry(host).or_insert(fetched);
        Some(())
    }

    async fn fetch(&self, robots_url: &str) -> Option<RobotsEntry> {
        let response = match self.client.get(robots_url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = robots_url, error = %e, "robots.txt fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                url = robots_url,
                status = %response.status(),
                "robots.txt returned non-success status"
            );
            return None;
        }

        let content = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(url = robots_url, error = %e, "robots.txt body read failed");
                return None;
            }
        };

        let crawl_delay = parse_crawl_delay(&content);
        Some(RobotsEntry {
            content,
            crawl_delay,
        })
    }

    /// Returns whether the configured user agent is allowed to fetch
    /// `url`, per robots.txt (or `true` if there is no usable
    /// robots.txt).
    pub async fn can_fetch(&self, url: &str) -> bool {
        if self.ensure_entry(url).await.is_none() {
            // Unparseable URL: let downstream validity checks handle it.
            return true;
        }

        let parsed = match ParsedUrl::parse(url) {
            Some(p) => p,
            None => return true,
        };

        let guard = self.entries.lock().await;
        match guard.get(&parsed.authority) {
            Some(Some(entry)) => DefaultMatcher::default().one_agent_allowed_by_robots(
                &entry.content,
                &self.user_agent,
                url,
            ),
            _ => true,
        }
    }

    /// The robots-specified crawl delay for `url`'s host, or the
    /// configured default when robots.txt is silent or absent.
    pub async fn crawl_delay(&self, url: &str) -> Duration {
        if self.ensure_entry(url).await.is_none() {
            return self.default_crawl_delay;
        }

        let parsed = match ParsedUrl::parse(url) {
            Some(p) => p,
            None => return self.default_crawl_delay,
        };

        let guard = self.entries.lock().await;
        match guard.get(&parsed.authority) {
            Some(Some(entry)) => entry.crawl_delay.unwrap_or(self.default_crawl_delay),
            _ => self.default_crawl_delay,
        }
    }

    /// The hosts for which a robots.txt fetch was attempted, for output
    /// serialization.
    pub async fn fetched_hosts(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }
}

fn parse_crawl_delay(robots_content: &str) -> Option<Duration> {
    robots_content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("crawl-delay") {
                value.trim().parse::<f64>().ok()
            } else {
                None
            }
        })
        .next()
        .map(Duration::from_secs_f64)
}
