//! Typed crawler configuration, loaded from a TOML file and overridable
//! from the command line. Field names follow the config keys from the
//! original crawler's `config.py` (`DEFAULT_CRAWL_DELAY`,
//! `NUM_RETRIEVER_THREADS`, ...), translated to idiomatic snake_case.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Seconds that need to pass before another request is made to a
/// resource of a single domain, when robots.txt is silent on the
/// matter.
const DEFAULT_CRAWL_DELAY_SECS: f64 = 0.5;
const DEFAULT_NUM_RETRIEVER_THREADS: usize = 1;
const DEFAULT_NUM_EXTRACTOR_THREADS: usize = 1;
const DEFAULT_USER_AGENT: &str = "topical-crawler/0.1";
const DEFAULT_CRAWLING_LIMIT: usize = 100;
const DEFAULT_GROUND_TRUTH_FILE: &str = "assets/ground_truth_vectors.json";
const DEFAULT_SEED_FILE: &str = "assets/seed.csv";
const DEFAULT_BLACKLIST_FILE: &str = "assets/blacklist.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_IDLE_SLEEP_MS: u64 = 100;

/// Fully resolved configuration for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub default_crawl_delay: Duration,
    pub num_retrievers: usize,
    pub num_extractors: usize,
    pub user_agent: String,
    pub crawl_limit: usize,
    pub ground_truth_file: PathBuf,
    pub seed_file: PathBuf,
    pub blacklist_file: PathBuf,
    pub http_timeout: Duration,
    pub idle_sleep: Duration,
    pub output_dir: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_crawl_delay: Duration::from_secs_f64(DEFAULT_CRAWL_DELAY_SECS),
            num_retrievers: DEFAULT_NUM_RETRIEVER_THREADS,
            num_extractors: DEFAULT_NUM_EXTRACTOR_THREADS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            crawl_limit: DEFAULT_CRAWLING_LIMIT,
            ground_truth_file: PathBuf::from(DEFAULT_GROUND_TRUTH_FILE),
            seed_file: PathBuf::from(DEFAULT_SEED_FILE),
            blacklist_file: PathBuf::from(DEFAULT_BLACKLIST_FILE),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            idle_sleep: Duration::from_millis(DEFAULT_IDLE_SLEEP_MS),
            output_dir: PathBuf::from("assets"),
        }
    }
}

/// On-disk, partially-specified form of [`CrawlerConfig`]. Every field is
/// optional so a config file only needs to mention the keys it wants to
/// override.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CrawlerConfigFile {
    pub default_crawl_delay_secs: Option<f64>,
    pub num_retrievers: Option<usize>,
    pub num_extractors: Option<usize>,
    pub user_agent: Option<String>,
    pub crawl_limit: Option<usize>,
    pub ground_truth_file: Option<PathBuf>,
    pub seed_file: Option<PathBuf>,
    pub blacklist_file: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl CrawlerConfig {
    /// Merges a parsed config file on top of the defaults.
    pub fn apply_file(mut self, file: CrawlerConfigFile) -> Self {
        if let Some(v) = file.default_crawl_delay_secs {
            self.default_crawl_delay = Duration::from_secs_f64(v);
        }
        if let Some(v) = file.num_retrievers {
            self.num_retrievers = v;
        }
        if let Some(v) = file.num_extractors {
            self.num_extractors = v;
        }
        if let Some(v) = file.user_agent {
            self.user_agent = v;
        }
        if let Some(v) = file.crawl_limit {
            self.crawl_limit = v;
        }
        if let Some(v) = file.ground_truth_file {
            self.ground_truth_file = v;
        }
        if let Some(v) = file.seed_file {
            self.seed_file = v;
        }
        if let Some(v) = file.blacklist_file {
            self.blacklist_file = v;
        }
        if let Some(v) = file.http_timeout_secs {
            self.http_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        self
    }

    /// Loads a config file from `path`, merging it onto the defaults.
    /// Missing files are treated as "use defaults", matching the
    /// original's behavior of compile-time constants with no required
    /// external file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(crate::error::CrawlError::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let file: CrawlerConfigFile =
            toml::from_str(&contents).map_err(|source| crate::error::CrawlError::ConfigParse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;

        Ok(Self::default().apply_file(file))
    }
}
