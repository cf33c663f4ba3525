//! LIFO buffer of fetched-but-not-yet-extracted pages. Ported from
//! `original_source/storage.py: UnprocessedHTMLDatabase`, which pops
//! from the end of a plain list -- i.e. most-recently-added first.

use tokio::sync::Mutex;

pub struct UnprocessedPage {
    pub url: String,
    pub is_seed: bool,
    pub html: String,
}

#[derive(Default)]
pub struct UnprocessedHtmlBuffer {
    inner: Mutex<Vec<UnprocessedPage>>,
}

impl UnprocessedHtmlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, url: String, is_seed: bool, html: String) {
        self.inner.lock().await.push(UnprocessedPage {
            url,
            is_seed,
            html,
        });
    }

    /// Pops the most recently pushed page, if any.
    pub async fn pop(&self) -> Option<UnprocessedPage> {
        self.inner.lock().await.pop()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pop_returns_most_recently_pushed() {
        let buffer = UnprocessedHtmlBuffer::new();
        buffer
            .push("http://a.test/".to_string(), true, "<html>a</html>".to_string())
            .await;
        buffer
            .push("http://b.test/".to_string(), false, "<html>b</html>".to_string())
            .await;

        let page = buffer.pop().await.unwrap();
        assert_eq!(page.url, "http://b.test/");
        assert!(!page.is_seed);
    }

    #[tokio::test]
    async fn pop_on_empty_buffer_returns_none() {
        let buffer = UnprocessedHtmlBuffer::new();
        assert!(buffer.pop().await.is_none());
    }
}
