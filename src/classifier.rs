//! The classifier interface: a narrow capability the extractor depends
//! on, opaque to this crate. Training, vector math, and the offline
//! ground-truth pipeline (`original_source/classification.py`) are out
//! of scope per the spec; only the oracle boundary is modeled here so
//! the core engine stays testable with a stub.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CrawlError, Result};

/// The category name used for pages the classifier judges not relevant.
pub const NOT_RELEVANT_CATEGORY: &str = "not_relevant";

/// The verdict returned by a classifier for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub relevant: bool,
    pub distances: HashMap<String, f64>,
    pub relative_distances: HashMap<String, f64>,
    pub guessed_category: String,
}

impl Classification {
    /// The relevance-ordering key used to sort the final HTML store:
    /// the relative distance of the guessed category, or 0 for
    /// not-relevant pages (matches
    /// `original_source/storage.py: get_relative_distance`).
    pub fn relative_distance(&self) -> f64 {
        if !self.relevant {
            return 0.0;
        }
        self.relative_distances
            .get(&self.guessed_category)
            .copied()
            .unwrap_or(0.0)
    }
}

/// A pluggable relevance classifier. Implementations wrap whatever
/// embedding model and ground-truth vectors are in use; this crate never
/// looks inside.
pub trait Classifier: Send + Sync {
    /// Loads classifier parameters (e.g. ground-truth embeddings) from
    /// `path`. Failure here is fatal at startup.
    fn load_parameters(&mut self, path: &Path) -> Result<()>;

    /// Classifies one page. Implementations should treat parse failures
    /// on their end as "not relevant, zero distances" rather than
    /// propagating an error, per the spec's error-handling design.
    fn classify(&self, url: &str, html: &str) -> Classification;
}

/// A deterministic stand-in classifier for tests: relevant iff the HTML
/// contains a configured marker string.
#[derive(Debug, Default)]
pub struct StubClassifier {
    pub relevant_marker: String,
    pub category: String,
}

impl StubClassifier {
    pub fn new(relevant_marker: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            relevant_marker: relevant_marker.into(),
            category: category.into(),
        }
    }

    /// A classifier that treats every page as relevant, for tests that
    /// only care about the crawl mechanics.
    pub fn always_relevant(category: impl Into<String>) -> Self {
        Self {
            relevant_marker: String::new(),
            category: category.into(),
        }
    }
}

impl Classifier for StubClassifier {
    fn load_parameters(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CrawlError::ClassifierParams {
                path: path.to_path_buf(),
                reason: "ground truth vectors file not found".to_string(),
            });
        }
        Ok(())
    }

    fn classify(&self, _url: &str, html: &str) -> Classification {
        let relevant = self.relevant_marker.is_empty() || html.contains(&self.relevant_marker);
        let mut distances = HashMap::new();
        let mut relative_distances = HashMap::new();

        if relevant {
            distances.insert(self.category.clone(), 0.1);
            relative_distances.insert(self.category.clone(), 0.1);
        }

        Classification {
            relevant,
            distances,
            relative_distances,
            guessed_category: if relevant {
                self.category.clone()
            } else {
                NOT_RELEVANT_CATEGORY.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_classifies_by_marker() {
        let classifier = StubClassifier::new("rust", "programming");
        let hit = classifier.classify("http://x/", "<html>all about rust</html>");
        assert!(hit.relevant);
        assert_eq!(hit.guessed_category, "programming");

        let miss = classifier.classify("http://x/", "<html>cooking</html>");
        assert!(!miss.relevant);
        assert_eq!(miss.guessed_category, NOT_RELEVANT_CATEGORY);
    }

    #[test]
    fn relative_distance_is_zero_for_not_relevant() {
        let classification = Classification {
            relevant: false,
            distances: HashMap::new(),
            relative_distances: HashMap::new(),
            guessed_category: NOT_RELEVANT_CATEGORY.to_string(),
        };
        assert_eq!(classification.relative_distance(), 0.0);
    }
}
