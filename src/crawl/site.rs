// src/crawl/site.rs
// =============================================================================
// This module crawls a single hostname.
//
// Two strategies:
// - Bounded: fetch the root page, then analyze the first N same-prefix links
//   it points to (N = links_per_site, 5 by default). At most 1 + N pages.
// - Recursive: breadth-first from the root, following same-prefix links
//   until max_depth hops away. No per-level cap. Optionally a second pass
//   dials the same host over the other of http/https.
//
// Both share one Session per hostname so cookies carry over between pages.
// If the root page cannot be fetched the whole hostname is given up; any
// other page that fails is simply left out.
//
// Rust concepts:
// - VecDeque: queue for breadth-first crawling
// - HashSet: URLs we already visited
// - Arc: the config is shared with every hostname task
// =============================================================================

use log::{info, warn};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

use super::session::Session;
use crate::analyze::{PageAnalyzer, SiteResult};
use crate::config::{CrawlConfig, CrawlStrategy};
use crate::resolve::Hostname;

// Represents a page in the crawl queue
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize, // Link hops from the root page (root = 0)
}

/// Where to start crawling and what to file bounded results under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    pub key: String,
    pub base_url: String,
}

pub struct SiteCrawler {
    config: Arc<CrawlConfig>,
    analyzer: PageAnalyzer,
}

impl SiteCrawler {
    pub fn new(config: Arc<CrawlConfig>) -> Self {
        let analyzer = PageAnalyzer::new(&config);
        SiteCrawler { config, analyzer }
    }

    // <scheme>://<hostname>, filed under the hostname
    pub fn target(&self, hostname: &Hostname) -> SiteTarget {
        SiteTarget {
            key: hostname.to_string(),
            base_url: format!("{}://{}", self.config.scheme, hostname),
        }
    }

    /// Crawl one site; None when its root page is unavailable
    ///
    /// Bounded results are filed under `target.key`. Recursive results are
    /// filed under the host each page was finally served from.
    pub async fn crawl(&self, target: &SiteTarget) -> Option<SiteResult> {
        let base_url = target.base_url.as_str();
        let session = match Session::new(&self.config) {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not build a session for {}: {}", base_url, e);
                return None;
            }
        };

        info!("Crawling {} ({:?})", base_url, self.config.strategy);
        match self.config.strategy {
            CrawlStrategy::Bounded => self.crawl_bounded(&session, base_url, &target.key).await,
            CrawlStrategy::Recursive => {
                let mut visited = HashSet::new();
                let mut site = SiteResult::new();
                let mut reached = false;
                for base_url in self.recursive_bases(base_url) {
                    reached |= self
                        .crawl_recursive(&session, &base_url, &mut visited, &mut site)
                        .await;
                }
                reached.then_some(site)
            }
        }
    }

    // The base URL, then the same URL over the other of http/https when asked
    fn recursive_bases(&self, base_url: &str) -> Vec<String> {
        let mut bases = vec![base_url.to_string()];
        if self.config.dial_both_schemes {
            if let Ok(mut url) = Url::parse(base_url) {
                let other = if url.scheme() == "https" { "http" } else { "https" };
                if url.set_scheme(other).is_ok() {
                    // Url keeps the trailing slash; the base is a link prefix
                    bases.push(url.as_str().trim_end_matches('/').to_string());
                }
            }
        }
        bases
    }

    async fn crawl_bounded(&self, session: &Session, base_url: &str, key: &str) -> Option<SiteResult> {
        let root = match session.get(base_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Error accessing {}: {}", base_url, e);
                return None;
            }
        };

        let root = self.analyzer.analyze_fetched(session, root, None).await;
        let mut pages = vec![root.record];

        for link in root.links.iter().take(self.config.links_per_site) {
            if let Some(record) = self.analyzer.analyze_page(session, link).await {
                pages.push(record);
            }
        }

        let mut site = SiteResult::new();
        site.insert(key.to_string(), pages);
        Some(site)
    }

    // Breadth-first from one base URL into `site`; false when its root fails
    async fn crawl_recursive(
        &self,
        session: &Session,
        base_url: &str,
        visited: &mut HashSet<String>,
        site: &mut SiteResult,
    ) -> bool {
        // Canonical form, so a later link back to "/" counts as visited
        let root_url = Url::parse(base_url)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| base_url.to_string());

        let mut queue = VecDeque::new();
        queue.push_back(CrawlItem {
            url: root_url,
            depth: 0,
        });

        while let Some(item) = queue.pop_front() {
            if !visited.insert(item.url.clone()) {
                continue;
            }

            let page = match session.get(&item.url).await {
                Ok(page) => page,
                Err(e) if item.depth == 0 => {
                    warn!("Error accessing {}: {}", base_url, e);
                    return false;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", item.url, e);
                    continue;
                }
            };

            let host = network_location(&page.final_url);
            let analyzed = self.analyzer.analyze_fetched(session, page, Some(base_url)).await;
            site.entry(host).or_default().push(analyzed.record);

            if item.depth < self.config.max_depth {
                for link in analyzed.links {
                    if !visited.contains(&link) {
                        queue.push_back(CrawlItem {
                            url: link,
                            depth: item.depth + 1,
                        });
                    }
                }
            }
        }

        true
    }
}

// host[:port], the key recursive results are grouped under
fn network_location(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
