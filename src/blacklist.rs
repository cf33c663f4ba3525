//! Static blacklist of domains and path extensions, loaded from a JSON
//! file with three arrays. Ported from the original crawler's
//! `extractor.py: is_on_blacklist`.

use std::path::Path;

use serde::Deserialize;

use crate::domain::{main_domain, registrable_domain};
use crate::error::{CrawlError, Result};

/// `{ "main_domains": [...], "main_domains+tlds": [...], "extensions": [...] }`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Blacklist {
    pub main_domains: Vec<String>,
    #[serde(rename = "main_domains+tlds")]
    pub main_domains_plus_tlds: Vec<String>,
    pub extensions: Vec<String>,
}

impl Blacklist {
    /// Loads a blacklist file, returning an empty (permissive) blacklist
    /// if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CrawlError::BlacklistFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| CrawlError::BlacklistParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks whether `url` matches the blacklist on any of the three
    /// dimensions: bare main domain, main-domain-plus-tld, or path
    /// extension.
    pub fn matches(&self, url: &str) -> bool {
        if let Some(domain) = main_domain(url) {
            if self.main_domains.iter().any(|d| d == &domain) {
                return true;
            }
        }

        if let Some(domain_tld) = registrable_domain(url) {
            if self.main_domains_plus_tlds.iter().any(|d| d == &domain_tld) {
                return true;
            }
        }

        if let Some(path) = crate::domain::ParsedUrl::parse(url).map(|p| p.path) {
            if self
                .extensions
                .iter()
                .any(|ext| path.len() >= ext.len() && path.ends_with(ext.as_str()))
            {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Blacklist {
        Blacklist {
            main_domains: vec!["spam".to_string()],
            main_domains_plus_tlds: vec!["ads.example".to_string()],
            extensions: vec![".pdf".to_string()],
        }
    }

    #[test]
    fn matches_on_main_domain() {
        assert!(sample().matches("http://spam.com/x"));
    }

    #[test]
    fn matches_on_domain_plus_tld() {
        assert!(sample().matches("http://ads.example/page"));
    }

    #[test]
    fn matches_on_extension() {
        assert!(sample().matches("http://clean.org/file.pdf"));
    }

    #[test]
    fn non_matching_url_passes() {
        assert!(!sample().matches("http://clean.org/index.html"));
    }

    #[test]
    fn missing_file_yields_permissive_blacklist() {
        let blacklist = Blacklist::load(Path::new("/no/such/blacklist.json")).unwrap();
        assert!(!blacklist.matches("http://anything.com/x.pdf"));
    }
}
