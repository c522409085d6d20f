// src/run.rs
// =============================================================================
// The run coordinator.
//
// What happens here:
// 1. Resolve the root domain into hostnames
// 2. Crawl every hostname as its own task, a bounded number at a time
// 3. Collect what each task returns and merge it into one RunResult
// 4. Write the RunResult as pretty JSON
//
// Tasks never touch the shared result. Each one hands back its SiteResult
// and the coordinator does all the inserting after the task has finished.
// A hostname that times out, panics, or has no reachable root page just
// doesn't appear in the output.
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::analyze::{RunResult, SiteResult};
use crate::config::CrawlConfig;
use crate::crawl::{SiteCrawler, SiteTarget};
use crate::resolve::{Hostname, Resolver};

pub struct Coordinator {
    config: Arc<CrawlConfig>,
    resolver: Resolver,
}

impl Coordinator {
    // Uses the source list from the config
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client for subdomain sources")?;
        let resolver = Resolver::from_config(&config, client);
        Ok(Coordinator::with_resolver(config, resolver))
    }

    pub fn with_resolver(config: CrawlConfig, resolver: Resolver) -> Self {
        Coordinator {
            config: Arc::new(config),
            resolver,
        }
    }

    /// Resolve, crawl and aggregate everything under one root domain
    pub async fn run(&self, root_domain: &str) -> Result<RunResult> {
        let hostnames = self
            .resolver
            .resolve(root_domain)
            .await
            .with_context(|| format!("Cannot enumerate '{}'", root_domain))?;

        info!("Found {} hostname(s) for {}", hostnames.len(), root_domain);
        for hostname in &hostnames {
            info!("  {}", hostname);
        }

        Ok(self.crawl_all(hostnames).await)
    }

    /// Crawl hostnames concurrently and merge their results
    pub async fn crawl_all(&self, hostnames: Vec<Hostname>) -> RunResult {
        let crawler = Arc::new(SiteCrawler::new(Arc::clone(&self.config)));
        let targets = hostnames.iter().map(|hostname| crawler.target(hostname)).collect();
        self.crawl_targets(crawler, targets).await
    }

    async fn crawl_targets(&self, crawler: Arc<SiteCrawler>, targets: Vec<SiteTarget>) -> RunResult {
        let site_timeout = self.config.site_timeout;

        // One spawned task per site; the timeout lives inside the task so
        // expiring it drops that site's remaining fetches and nothing else
        let tasks = targets.into_iter().map(|target| {
            let crawler = Arc::clone(&crawler);
            async move {
                let key = target.key.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::timeout(site_timeout, crawler.crawl(&target)).await
                });
                (key, handle.await)
            }
        });

        // Up to `concurrency` sites in flight; results arrive as they finish
        let outcomes: Vec<_> = stream::iter(tasks)
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut results = RunResult::new();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(Ok(Some(site))) => merge_site(&mut results, site),
                Ok(Ok(None)) => info!("No pages for {}", key),
                Ok(Err(_)) => warn!("Gave up on {} after {:?}", key, site_timeout),
                Err(e) => warn!("Crawl task for {} failed: {}", key, e),
            }
        }
        results
    }
}

fn merge_site(results: &mut RunResult, site: SiteResult) {
    for (host, pages) in site {
        if !pages.is_empty() {
            results.entry(host).or_default().extend(pages);
        }
    }
}

/// Writes results as UTF-8 JSON with two-space indentation
pub fn write_results(path: &Path, results: &RunResult) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
