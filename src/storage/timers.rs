//! Per-domain politeness timers. Ported from
//! `original_source/storage.py: DomainTimers`. Uses a monotonic clock
//! (`tokio::time::Instant`) rather than wall-clock time.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Default)]
pub struct DomainTimers {
    last_request: Mutex<HashMap<String, Instant>>,
}

impl DomainTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes `max(0, crawl_delay - (now - last[domain]))`, or 0 if
    /// there is no entry yet for `domain`. The sleep itself happens
    /// after this method returns and the lock is released.
    pub async fn time_until_next_request(&self, domain: &str, crawl_delay: Duration) -> Duration {
        let guard = self.last_request.lock().await;
        match guard.get(domain) {
            None => Duration::ZERO,
            Some(last) => {
                let elapsed = last.elapsed();
                crawl_delay.saturating_sub(elapsed)
            }
        }
    }

    /// Records `now` as the last-fetch timestamp for `domain`.
    pub async fn set_timer(&self, domain: &str) {
        let mut guard = self.last_request.lock().await;
        guard.insert(domain.to_string(), Instant::now());
    }
}
