//! Command-line entry point: loads configuration, the seed file, and
//! the blacklist, then hands everything to the supervisor. Ported from
//! `original_source/main.py`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use topical_crawler::classifier::{Classifier, StubClassifier};
use topical_crawler::config::CrawlerConfig;
use topical_crawler::{logging, supervisor};

#[derive(Parser, Debug)]
#[clap(author, version, about = "A focused topical web crawler")]
struct Args {
    /// Path to a TOML config file; missing file falls back to defaults.
    #[clap(long, default_value = "config.toml")]
    config: PathBuf,

    /// Seconds to wait between requests to the same domain when
    /// robots.txt is silent on the matter.
    #[clap(long)]
    crawl_delay: Option<f64>,

    /// Number of concurrent retriever workers.
    #[clap(long)]
    retrievers: Option<usize>,

    /// Number of concurrent extractor workers.
    #[clap(long)]
    extractors: Option<usize>,

    /// User-Agent header sent with every request.
    #[clap(long)]
    user_agent: Option<String>,

    /// Maximum number of URLs to crawl; 0 means unlimited.
    #[clap(long)]
    limit: Option<usize>,

    /// Path to the ground-truth vectors file the classifier loads at
    /// startup.
    #[clap(long)]
    ground_truth: Option<PathBuf>,

    /// Path to the newline-separated seed file.
    #[clap(long)]
    seed_file: Option<PathBuf>,

    /// Path to the blacklist JSON file.
    #[clap(long)]
    blacklist_file: Option<PathBuf>,

    /// Directory the six output files are written to.
    #[clap(long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: CrawlerConfig) -> CrawlerConfig {
        if let Some(v) = self.crawl_delay {
            config.default_crawl_delay = std::time::Duration::from_secs_f64(v);
        }
        if let Some(v) = self.retrievers {
            config.num_retrievers = v;
        }
        if let Some(v) = self.extractors {
            config.num_extractors = v;
        }
        if let Some(v) = self.user_agent {
            config.user_agent = v;
        }
        if let Some(v) = self.limit {
            config.crawl_limit = v;
        }
        if let Some(v) = self.ground_truth {
            config.ground_truth_file = v;
        }
        if let Some(v) = self.seed_file {
            config.seed_file = v;
        }
        if let Some(v) = self.blacklist_file {
            config.blacklist_file = v;
        }
        if let Some(v) = self.output_dir {
            config.output_dir = v;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = Args::parse();
    let config_path = args.config.clone();
    let config = CrawlerConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let config = args.apply(config);

    // The embedding classifier itself is an external concern (see
    // `topical_crawler::classifier`); this binary plugs in a stub that
    // treats every page as relevant so the crawl mechanics can be
    // exercised standalone. Wire a real `Classifier` impl here to use
    // this binary for topical crawling in earnest.
    let mut classifier = StubClassifier::always_relevant("general");
    if let Err(e) = classifier.load_parameters(&config.ground_truth_file) {
        tracing::error!(error = %e, "classifier parameters could not be loaded, aborting");
        std::process::exit(1);
    }
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let outcome = supervisor::run(config.clone(), classifier).await?;

    let prefix = supervisor::timestamp_prefix(chrono::Utc::now());
    supervisor::write_outputs(&config.output_dir, &prefix, &outcome).await?;

    println!(
        "crawled {} urls, {} left unprocessed, {} stored, {} relevant",
        outcome.summary.crawled,
        outcome.summary.unprocessed,
        outcome.summary.stored,
        outcome.summary.relevant,
    );

    Ok(())
}
