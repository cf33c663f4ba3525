//! Directed edge log recording link discovery. Ported from
//! `original_source/storage.py: URLMap`. Diagram rendering
//! (`draw_map`/`diagrams`) is out of scope per spec.md §1 ("plotting
//! tools... excluded").

use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
}

#[derive(Default)]
pub struct UrlMap {
    edges: Mutex<Vec<EdgeRecord>>,
}

impl UrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_edge(&self, from: String, to: String) {
        self.edges.lock().await.push(EdgeRecord { from, to });
    }

    pub async fn edges(&self) -> Vec<EdgeRecord> {
        self.edges.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_edges_in_insertion_order() {
        let map = UrlMap::new();
        map.add_edge("http://a.test/".to_string(), "http://b.test/".to_string())
            .await;
        map.add_edge("http://a.test/".to_string(), "http://c.test/".to_string())
            .await;
        let edges = map.edges().await;
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to, "http://b.test/");
        assert_eq!(edges[1].to, "http://c.test/");
    }
}
