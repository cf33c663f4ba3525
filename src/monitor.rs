//! Tracks every worker's state and exposes the predicates used for
//! termination decisions plus a broadcast stop signal. Ported from
//! `original_source/monitoring.py: GlobalMonitor`/`ThreadState`.
//!
//! The original registers thread objects and calls `stop_extractor`/
//! `stop_retriever` directly on them. The idiomatic tokio rendition uses
//! a `watch` channel instead: workers subscribe at construction and poll
//! it each iteration, which is how cooperative shutdown is signalled
//! across spawned tasks without holding a `Vec` of join handles.

use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Running,
    Idle,
    Stopped,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    running: usize,
    idle: usize,
    stopped: usize,
}

pub struct GlobalMonitor {
    num_retrievers: usize,
    num_extractors: usize,
    retrievers: Mutex<Counts>,
    extractors: Mutex<Counts>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl GlobalMonitor {
    pub fn new(num_retrievers: usize, num_extractors: usize) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            num_retrievers,
            num_extractors,
            retrievers: Mutex::new(Counts {
                running: num_retrievers,
                idle: 0,
                stopped: 0,
            }),
            extractors: Mutex::new(Counts {
                running: num_extractors,
                idle: 0,
                stopped: 0,
            }),
            stop_tx,
            stop_rx,
        }
    }

    /// A fresh receiver for a worker to poll for the global stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    pub fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    pub async fn retriever_idle(&self, previous: ThreadState) {
        let mut counts = self.retrievers.lock().await;
        if previous == ThreadState::Running {
            counts.running -= 1;
            counts.idle += 1;
        }
    }

    pub async fn retriever_continue(&self, previous: ThreadState) {
        let mut counts = self.retrievers.lock().await;
        if previous == ThreadState::Idle {
            counts.running += 1;
            counts.idle -= 1;
        }
    }

    pub async fn retriever_stop(&self, previous: ThreadState) {
        let mut counts = self.retrievers.lock().await;
        match previous {
            ThreadState::Running => counts.running -= 1,
            ThreadState::Idle => counts.idle -= 1,
            ThreadState::Stopped => {}
        }
        counts.stopped += 1;
    }

    pub async fn all_retrievers_idle_or_stopped(&self) -> bool {
        let counts = self.retrievers.lock().await;
        counts.idle + counts.stopped == self.num_retrievers
    }

    pub async fn extractor_idle(&self, previous: ThreadState) {
        let mut counts = self.extractors.lock().await;
        if previous == ThreadState::Running {
            counts.running -= 1;
            counts.idle += 1;
        }
    }

    pub async fn extractor_continue(&self, previous: ThreadState) {
        let mut counts = self.extractors.lock().await;
        if previous == ThreadState::Idle {
            counts.running += 1;
            counts.idle -= 1;
        }
    }

    pub async fn extractor_stop(&self, previous: ThreadState) {
        let mut counts = self.extractors.lock().await;
        match previous {
            ThreadState::Running => counts.running -= 1,
            ThreadState::Idle => counts.idle -= 1,
            ThreadState::Stopped => {}
        }
        counts.stopped += 1;
    }

    pub async fn all_extractors_idle_or_stopped(&self) -> bool {
        let counts = self.extractors.lock().await;
        counts.idle + counts.stopped == self.num_extractors
    }

    /// Broadcasts a stop request to every subscribed worker. Workers
    /// observe this on their next iteration and transition themselves
    /// to `Stopped`; in-flight I/O is not interrupted.
    pub fn stop_everything(&self, reason: &str) {
        tracing::error!(reason, "stopping everything");
        let _ = self.stop_tx.send(true);
    }
}
