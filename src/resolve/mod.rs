// src/resolve/mod.rs
// =============================================================================
// This module turns a root domain into the list of hostnames we will crawl.
//
// Sources (tried in priority order, the first one that finds anything wins):
// - crtsh: certificate-transparency search
// - tool: an external enumeration binary (amass)
// - wordlist: common labels glued onto the root domain
//
// Whatever happens, the root domain itself is always part of the result.
// =============================================================================

mod crtsh;
mod tool;
mod wordlist;

pub use crtsh::CrtShSource;
pub use tool::ExternalToolSource;
pub use wordlist::WordlistSource;

use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

use crate::config::{CrawlConfig, SourceKind};
use crate::error::ResolveError;

/// A DNS name equal to, or below, the root domain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hostname(String);

impl Hostname {
    // The root domain itself, after the same syntax check as any label
    pub fn root(root_domain: &str) -> Result<Self, ResolveError> {
        let root = root_domain.trim().trim_end_matches('.').to_ascii_lowercase();
        let label = Regex::new(r"^[a-z0-9-]+(\.[a-z0-9-]+)*$")
            .map_err(|_| ResolveError::InvalidRoot(root_domain.to_string()))?;
        if label.is_match(&root) {
            Ok(Hostname(root))
        } else {
            Err(ResolveError::InvalidRoot(root_domain.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts names strictly below one root domain
///
/// `foo.bar.example.com` passes for `example.com`; `evilexample.com` does not,
/// and neither does `example.com` itself.
#[derive(Debug, Clone)]
pub struct HostnameFilter {
    root: String,
    pattern: Regex,
}

impl HostnameFilter {
    pub fn new(root_domain: &str) -> Result<Self, ResolveError> {
        let root = root_domain.trim().to_ascii_lowercase();
        let pattern = Regex::new(&format!(
            r"^[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.{}$",
            regex::escape(&root)
        ))
        .map_err(|_| ResolveError::InvalidRoot(root_domain.to_string()))?;
        Ok(HostnameFilter { root, pattern })
    }

    pub fn is_valid_subdomain(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    // Normalizes a candidate name and keeps it if it is a proper subdomain
    pub fn accept(&self, candidate: &str) -> Option<Hostname> {
        let name = candidate.trim().trim_end_matches('.').to_ascii_lowercase();
        if name != self.root && self.is_valid_subdomain(&name) {
            Some(Hostname(name))
        } else {
            None
        }
    }
}

/// Anything that can suggest subdomains for a root domain
///
/// Sources report their own failures as errors; the resolver logs them and
/// treats the source as having found nothing.
#[async_trait]
pub trait SubdomainSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn enumerate(&self, filter: &HostnameFilter, root_domain: &str)
        -> Result<Vec<Hostname>, ResolveError>;
}

/// Runs sources in priority order until one produces names
pub struct Resolver {
    sources: Vec<Box<dyn SubdomainSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn SubdomainSource>>) -> Self {
        Resolver { sources }
    }

    // Builds the source list the config asks for, in the order it asks
    pub fn from_config(config: &CrawlConfig, client: reqwest::Client) -> Self {
        let sources = config
            .sources
            .iter()
            .map(|kind| -> Box<dyn SubdomainSource> {
                match kind {
                    SourceKind::Crtsh => Box::new(CrtShSource::new(
                        client.clone(),
                        &config.crtsh_endpoint,
                        config.include_expired,
                    )),
                    SourceKind::Tool => Box::new(ExternalToolSource::new(
                        &config.tool_program,
                        config.tool_args.clone(),
                    )),
                    SourceKind::Wordlist => {
                        Box::new(WordlistSource::new(config.wordlist_path.clone()))
                    }
                }
            })
            .collect();
        Resolver::new(sources)
    }

    /// Returns the root domain first, then every discovered subdomain in order
    pub async fn resolve(&self, root_domain: &str) -> Result<Vec<Hostname>, ResolveError> {
        let root = Hostname::root(root_domain)?;
        let filter = HostnameFilter::new(root.as_str())?;

        let mut found = BTreeSet::new();
        for source in &self.sources {
            match source.enumerate(&filter, root.as_str()).await {
                Ok(names) if !names.is_empty() => {
                    info!("{} found {} name(s) for {}", source.name(), names.len(), root);
                    found.extend(names);
                    break;
                }
                Ok(_) => info!("{} found nothing for {}, trying next source", source.name(), root),
                Err(e) => warn!("{}", e),
            }
        }

        found.remove(&root);
        let mut hostnames = Vec::with_capacity(found.len() + 1);
        hostnames.push(root);
        hostnames.extend(found);
        Ok(hostnames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        names: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl SubdomainSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn enumerate(
            &self,
            filter: &HostnameFilter,
            _root_domain: &str,
        ) -> Result<Vec<Hostname>, ResolveError> {
            if self.fail {
                return Err(ResolveError::Request {
                    source_name: "fixed".to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok(self.names.iter().filter_map(|n| filter.accept(n)).collect())
        }
    }

    fn names(hosts: &[Hostname]) -> Vec<&str> {
        hosts.iter().map(|h| h.as_str()).collect()
    }

    #[test]
    fn test_valid_subdomain_requires_dot_boundary() {
        let filter = HostnameFilter::new("example.com").unwrap();
        assert!(filter.is_valid_subdomain("foo.bar.example.com"));
        assert!(!filter.is_valid_subdomain("evilexample.com"));
        assert!(!filter.is_valid_subdomain("example.com"));
        assert!(!filter.is_valid_subdomain("*.example.com"));
        assert!(!filter.is_valid_subdomain("foo.example.com.evil.net"));
    }

    #[test]
    fn test_filter_normalizes_case_and_trailing_dot() {
        let filter = HostnameFilter::new("example.com").unwrap();
        assert_eq!(
            filter.accept(" WWW.Example.com. ").map(|h| h.to_string()),
            Some("www.example.com".to_string())
        );
        assert_eq!(filter.accept("example.com"), None);
    }

    #[test]
    fn test_root_rejects_garbage() {
        assert!(Hostname::root("example.com").is_ok());
        assert!(Hostname::root("exa mple.com").is_err());
        assert!(Hostname::root("").is_err());
    }

    #[tokio::test]
    async fn test_first_non_empty_source_wins() {
        let resolver = Resolver::new(vec![
            Box::new(FixedSource { names: vec![], fail: false }),
            Box::new(FixedSource { names: vec!["b.example.com", "a.example.com"], fail: false }),
            Box::new(FixedSource { names: vec!["never.example.com"], fail: false }),
        ]);
        let hosts = resolver.resolve("example.com").await.unwrap();
        assert_eq!(names(&hosts), vec!["example.com", "a.example.com", "b.example.com"]);
    }

    #[tokio::test]
    async fn test_failing_source_falls_through() {
        let resolver = Resolver::new(vec![
            Box::new(FixedSource { names: vec![], fail: true }),
            Box::new(FixedSource { names: vec!["api.example.com"], fail: false }),
        ]);
        let hosts = resolver.resolve("example.com").await.unwrap();
        assert_eq!(names(&hosts), vec!["example.com", "api.example.com"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_leaves_root() {
        let resolver = Resolver::new(vec![
            Box::new(FixedSource { names: vec![], fail: true }),
            Box::new(FixedSource { names: vec![], fail: false }),
        ]);
        let hosts = resolver.resolve("example.com").await.unwrap();
        assert_eq!(names(&hosts), vec!["example.com"]);
    }
}
