//! Error taxonomy for the crawler engine.
//!
//! Mirrors the failure policy from the design: transient network and
//! robots failures are never fatal (callers log and continue), while a
//! missing classifier configuration is fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while operating the crawling engine.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("robots.txt fetch/parse failed for host {host}: {reason}")]
    Robots { host: String, reason: String },

    #[error("classifier parameters could not be loaded from {path}: {reason}")]
    ClassifierParams { path: PathBuf, reason: String },

    #[error("seed file {path} could not be read: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blacklist file {path} could not be read: {source}")]
    BlacklistFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blacklist file {path} is not valid JSON: {source}")]
    BlacklistParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("output file {path} could not be written: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} could not be read: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
}

pub type Result<T> = std::result::Result<T, CrawlError>;
