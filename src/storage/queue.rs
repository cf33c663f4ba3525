//! Set-semantics URL queue. Ported from `original_source/storage.py`'s
//! `SetQueue`/`URLQueue`: insertion is idempotent and a later `put` never
//! downgrades an existing seed entry.

use indexmap::IndexMap;
use tokio::sync::Mutex;

/// Awaiting-fetch queue keyed by URL; the value is `is_seed`. Backed by
/// an `IndexMap` rather than a `HashSet<(String, bool)>` so a duplicate
/// `put` can be detected and rejected without first removing the
/// existing entry.
#[derive(Default)]
pub struct UrlQueue {
    inner: Mutex<IndexMap<String, bool>>,
}

impl UrlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the queue before any worker starts.
    pub async fn seed(&self, urls: impl IntoIterator<Item = String>) {
        let mut guard = self.inner.lock().await;
        for url in urls {
            guard.entry(url).or_insert(true);
        }
    }

    /// Inserts `url` if not already present. If `url` is already queued,
    /// the insert is silently dropped — including the `is_seed` flag: a
    /// later `put(url, false)` does not downgrade an entry already
    /// marked seed.
    pub async fn put(&self, url: String, is_seed: bool) {
        let mut guard = self.inner.lock().await;
        guard.entry(url).or_insert(is_seed);
    }

    /// Removes and returns an arbitrary entry. Ordering is unspecified.
    pub async fn get(&self) -> Option<(String, bool)> {
        let mut guard = self.inner.lock().await;
        guard.pop()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
