//! The final per-page results store. Ported from
//! `original_source/storage.py: HTMLDatabase`/`HTMLDatabaseEntry`. The
//! raw HTML body is kept in memory for in-process consumers but, like
//! the original's `to_json` (which comments out the html field), is
//! never part of the serialized output.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::classifier::Classification;

#[derive(Debug, Clone, Serialize)]
pub struct HtmlRecord {
    pub url: String,
    #[serde(skip)]
    pub html: String,
    pub relevant: bool,
    pub extracted_urls: Vec<String>,
    pub distances: HashMap<String, f64>,
    pub relative_distances: HashMap<String, f64>,
    pub guessed_category: String,
}

impl HtmlRecord {
    pub fn new(
        url: String,
        html: String,
        extracted_urls: Vec<String>,
        classification: Classification,
    ) -> Self {
        Self {
            url,
            html,
            relevant: classification.relevant,
            extracted_urls,
            distances: classification.distances,
            relative_distances: classification.relative_distances,
            guessed_category: classification.guessed_category,
        }
    }

    fn relative_distance(&self) -> f64 {
        if !self.relevant {
            return 0.0;
        }
        self.relative_distances
            .get(&self.guessed_category)
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Default)]
pub struct HtmlStore {
    records: Mutex<Vec<HtmlRecord>>,
}

impl HtmlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, record: HtmlRecord) {
        self.records.lock().await.push(record);
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Sorts the store ascending by relative distance of the guessed
    /// category, i.e. most-relevant (smallest distance) first. Entries
    /// classified as not relevant sort to the front with a distance of
    /// 0; callers that want only relevant URLs should use
    /// [`HtmlStore::relevant_urls`], which filters them out.
    pub async fn sort_by_relevance(&self) {
        let mut guard = self.records.lock().await;
        guard.sort_by(|a, b| {
            a.relative_distance()
                .partial_cmp(&b.relative_distance())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// `url,category` pairs for every relevant record, in the store's
    /// current order (call [`HtmlStore::sort_by_relevance`] first to get
    /// most-relevant-first ordering).
    pub async fn relevant_urls(&self) -> Vec<(String, String)> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.relevant)
            .map(|r| (r.url.clone(), r.guessed_category.clone()))
            .collect()
    }

    pub async fn snapshot(&self) -> Vec<HtmlRecord> {
        self.records.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, relevant: bool, category: &str, relative_distance: f64) -> HtmlRecord {
        let mut relative_distances = HashMap::new();
        if relevant {
            relative_distances.insert(category.to_string(), relative_distance);
        }
        HtmlRecord {
            url: url.to_string(),
            html: String::new(),
            relevant,
            extracted_urls: vec![],
            distances: HashMap::new(),
            relative_distances,
            guessed_category: if relevant {
                category.to_string()
            } else {
                "not_relevant".to_string()
            },
        }
    }

    #[tokio::test]
    async fn sorts_ascending_by_relative_distance() {
        let store = HtmlStore::new();
        store.add(record("http://far.test/", true, "news", 0.9)).await;
        store.add(record("http://close.test/", true, "news", 0.1)).await;
        store.sort_by_relevance().await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot[0].url, "http://close.test/");
        assert_eq!(snapshot[1].url, "http://far.test/");
    }

    #[tokio::test]
    async fn relevant_urls_excludes_not_relevant_entries() {
        let store = HtmlStore::new();
        store.add(record("http://a.test/", true, "news", 0.2)).await;
        store.add(record("http://b.test/", false, "news", 0.0)).await;
        let relevant = store.relevant_urls().await;
        assert_eq!(relevant, vec![("http://a.test/".to_string(), "news".to_string())]);
    }
}
