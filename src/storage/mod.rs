//! The six shared, concurrency-safe stores that make up the crawler's
//! state: the URL queue, the budgeted crawled-URL set, per-domain
//! timers, the robots.txt cache, the unprocessed-HTML buffer, the final
//! HTML store, and the URL map. Each store owns a single lock (or, for
//! the robots cache, a lock plus a best-effort fetch-outside-the-lock
//! pattern) — matching the "single mutex per store" sufficiency the
//! design calls for.

mod crawled;
mod html_store;
mod queue;
mod robots;
mod timers;
mod unprocessed;
mod url_map;

pub use crawled::CrawledUrls;
pub use html_store::{HtmlRecord, HtmlStore};
pub use queue::UrlQueue;
pub use robots::RobotsCache;
pub use timers::DomainTimers;
pub use unprocessed::{UnprocessedHtmlBuffer, UnprocessedPage};
pub use url_map::{EdgeRecord, UrlMap};
