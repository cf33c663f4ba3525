//! Budgeted, append-only set of dispatched URLs. Ported from
//! `original_source/storage.py: CrawledURLs`. Insertion is the
//! commitment point against the crawl budget: a retrieval failure never
//! removes the entry, so URLs are attempted at most once.

use std::collections::HashSet;

use tokio::sync::Mutex;

struct Inner {
    order: Vec<String>,
    seen: HashSet<String>,
}

pub struct CrawledUrls {
    inner: Mutex<Inner>,
    limit: usize,
}

impl CrawledUrls {
    /// `limit == 0` means unlimited.
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: Vec::new(),
                seen: HashSet::new(),
            }),
            limit,
        }
    }

    /// Atomically checks the budget and records `url` as dispatched in
    /// the same critical section, so concurrent retrievers can never
    /// push the count past `limit`. Returns `false` (without recording
    /// anything) if the budget was already exhausted by the time this
    /// call acquired the lock.
    pub async fn try_add(&self, url: String) -> bool {
        let mut guard = self.inner.lock().await;
        if self.limit > 0 && guard.order.len() >= self.limit {
            return false;
        }
        guard.seen.insert(url.clone());
        guard.order.push(url);
        tracing::info!(
            crawled = guard.order.len(),
            limit = self.limit,
            "URL dispatched to a retriever"
        );
        true
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.seen.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.order.len()
    }

    /// `true` once `size >= limit`, when `limit > 0`.
    pub async fn limit_reached(&self) -> bool {
        self.limit > 0 && self.len().await >= self.limit
    }

    /// The dispatched URLs in insertion order, for output serialization.
    pub async fn ordered(&self) -> Vec<String> {
        self.inner.lock().await.order.clone()
    }
}
