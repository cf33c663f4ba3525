//! A focused topical web crawler: retriever workers fetch seeded pages
//! (respecting `robots.txt` and per-domain politeness), extractor
//! workers classify relevance and follow links out of relevant (or
//! seed) pages, and both pools run until the shared state quiesces.

pub mod blacklist;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod monitor;
pub mod retriever;
pub mod storage;
pub mod supervisor;

pub use error::{CrawlError, Result};
