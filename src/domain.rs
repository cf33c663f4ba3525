//! URL validity checking, domain-grammar validation, registrable-domain
//! extraction, and the (intentionally simple) relative-to-absolute URL
//! resolver.
//!
//! Ported from the original crawler's `extractor.py` (`DOMAIN_FORMAT`,
//! `SCHEME_FORMAT`, `is_valid`, `relative_to_absolute_url`) and
//! `tools.py` (`extract_main_domain`, `extract_main_domain_plus_tld`).
//! This deliberately does not use `url::Url::parse` for validity: the
//! scheme set (`hxxp`/`fxp` included) and domain grammar here are
//! narrower/different from RFC 3986, so a dedicated regex-based check
//! keeps the behavior in lockstep with the specified grammar.

use std::sync::OnceLock;

use regex::Regex;

const MAX_URL_LEN: usize = 2048;

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(http|hxxp|ftp|fxp)s?$").unwrap())
}

fn domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?ix)
            ^(?:[\w]{1,255}:.{1,255}@|)
            (?:
                (?=\S{0,253}(?::|$))
                (?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+
                (?:[a-z0-9]{1,63})
                |localhost
            )
            (:\d{1,5})?$
            ",
        )
        .unwrap()
    })
}

fn registrable_domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.]+\.[^.]+$").unwrap())
}

fn main_domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^.]+)\.[^.]+$").unwrap())
}

/// A minimal decomposition of an absolute URL: scheme, authority
/// (host[:port]), path and query, exactly as much as the rest of the
/// engine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub authority: String,
    pub path: String,
    pub query: Option<String>,
}

impl ParsedUrl {
    /// Splits `url` into scheme / authority / path / query without
    /// validating any part. Returns `None` if there is no `scheme://`
    /// separator at all.
    pub fn parse(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let (authority_and_path, query) = match rest.split_once('?') {
            Some((a, q)) => (a, Some(q.to_string())),
            None => (rest, None),
        };
        let (authority, path) = match authority_and_path.split_once('/') {
            Some((a, p)) => (a.to_string(), format!("/{p}")),
            None => (authority_and_path.to_string(), String::new()),
        };
        Some(Self {
            scheme: scheme.to_string(),
            authority,
            path,
            query,
        })
    }

    /// The `host` part of the authority, with any `user:pass@` prefix
    /// and `:port` suffix stripped.
    pub fn host(&self) -> &str {
        let without_userinfo = match self.authority.rsplit_once('@') {
            Some((_, host)) => host,
            None => self.authority.as_str(),
        };
        match without_userinfo.split_once(':') {
            Some((host, _)) => host,
            None => without_userinfo,
        }
    }
}

/// Checks whether `url` passes the validity test from the spec: non-empty,
/// at most 2048 characters, a recognized scheme, and a host matching the
/// domain grammar (or the literal `localhost`), with an optional port.
pub fn is_valid(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.chars().count() > MAX_URL_LEN {
        return false;
    }

    let Some(parsed) = ParsedUrl::parse(url) else {
        return false;
    };

    if !scheme_re().is_match(&parsed.scheme) {
        return false;
    }

    if parsed.authority.is_empty() {
        return false;
    }

    domain_re().is_match(&parsed.authority)
}

/// Extracts the registrable domain used for politeness grouping: the
/// `[^.]+\.[^.]+$` suffix of the host. This is wrong for public suffixes
/// like `.co.uk` (it treats `co.uk` as the registrable domain) — that is
/// the documented, intentional contract, not a bug to silently fix (see
/// DESIGN.md's "Registrable-domain extraction" open question).
pub fn registrable_domain(url: &str) -> Option<String> {
    let host = ParsedUrl::parse(url)?.host().to_string();
    registrable_domain_re()
        .find(&host)
        .map(|m| m.as_str().to_string())
}

/// Extracts the label immediately before the top-level domain, e.g.
/// `www.example.co.uk` -> `example`.
pub fn main_domain(url: &str) -> Option<String> {
    let host = ParsedUrl::parse(url)?.host().to_string();
    main_domain_re()
        .captures(&host)
        .map(|c| c[1].to_string())
}

/// Resolves `relative` against `parent_url`, following the simplified
/// (not RFC 3986) algorithm from the spec:
/// - starts with `/` -> `scheme://host/<relative>`
/// - parent has no path -> `scheme://host/<relative>`
/// - otherwise -> `scheme://host/<parent path up to and including last
///   slash><relative>`
pub fn relative_to_absolute(relative: &str, parent_url: &str) -> Option<String> {
    let parent = ParsedUrl::parse(parent_url)?;
    let scheme_and_host = format!("{}://{}", parent.scheme, parent.authority);

    if relative.starts_with('/') {
        return Some(format!("{scheme_and_host}{relative}"));
    }

    if parent.path.is_empty() {
        return Some(format!("{scheme_and_host}/{relative}"));
    }

    match parent.path.rfind('/') {
        Some(idx) => Some(format!(
            "{scheme_and_host}{}{relative}",
            &parent.path[..=idx]
        )),
        None => Some(format!("{scheme_and_host}/{relative}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_http_url_is_valid() {
        assert!(is_valid("http://example.com/path?x=1"));
        assert!(is_valid("https://example.co.uk:8080/a/b"));
        assert!(is_valid("hxxps://example.com/"));
        assert!(is_valid("http://localhost:3000/"));
    }

    #[test]
    fn invalid_urls_are_rejected() {
        assert!(!is_valid(""));
        assert!(!is_valid("not a url"));
        assert!(!is_valid("mailto:a@b.com"));
        assert!(!is_valid("javascript:void(0)"));
        assert!(!is_valid(&format!("http://example.com/{}", "a".repeat(2048))));
        assert!(!is_valid("ftp2://example.com/"));
    }

    #[test]
    fn registrable_domain_uses_naive_last_two_labels() {
        assert_eq!(
            registrable_domain("http://www.example.com/x"),
            Some("example.com".to_string())
        );
        // Documented, intentional quirk: treats `co.uk` as registrable.
        assert_eq!(
            registrable_domain("http://www.example.co.uk/x"),
            Some("co.uk".to_string())
        );
    }

    #[test]
    fn main_domain_strips_tld() {
        assert_eq!(
            main_domain("http://www.example.com/x"),
            Some("example".to_string())
        );
    }

    #[test]
    fn relative_resolution_matches_spec_examples() {
        let parent = "http://x.test/a/b/c.html";
        assert_eq!(
            relative_to_absolute("/d", parent),
            Some("http://x.test/d".to_string())
        );
        assert_eq!(
            relative_to_absolute("e.html", parent),
            Some("http://x.test/a/b/e.html".to_string())
        );
    }

    #[test]
    fn relative_resolution_with_empty_parent_path() {
        assert_eq!(
            relative_to_absolute("mytest.html", "https://www.google.com"),
            Some("https://www.google.com/mytest.html".to_string())
        );
    }

    #[test]
    fn absolute_url_resolves_to_itself() {
        let absolute = "http://example.com/path";
        // Resolving an absolute-looking relative (leading slash case)
        // against any parent reproduces the same host + path.
        assert_eq!(
            relative_to_absolute("/path", "http://example.com/ignored"),
            Some(absolute.to_string())
        );
    }
}
