// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage: form-scout <DOMAIN> [MAX_DEPTH] [OPTIONS]
//
// The two positionals mirror the classic `run <domain> [max_depth]` call;
// everything else is an optional flag with a sensible default. The parsed
// Cli is turned into a CrawlConfig once and never consulted again.
// =============================================================================

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    CrawlConfig, CrawlStrategy, SourceKind, DEFAULT_RETRYABLE_STATUS_CODES, DEFAULT_WORDLIST_PATH,
};

#[derive(Parser, Debug)]
#[command(
    name = "form-scout",
    version,
    about = "Enumerate subdomains and map the forms, inputs, cookies and CSRF tokens they expose",
    long_about = "form-scout finds subdomains of a root domain (certificate transparency, an external \
                  enumeration tool, or a wordlist), visits a few pages on each, and records the forms, \
                  input fields, cookies and CSRF tokens it sees in <domain>_analysis.json."
)]
pub struct Cli {
    /// Root domain to enumerate (e.g. example.com)
    pub domain: String,

    /// Maximum crawl depth, used by the recursive strategy
    #[arg(default_value_t = 3)]
    pub max_depth: usize,

    /// How far to crawl each hostname
    #[arg(long, value_enum, default_value_t = CrawlStrategy::Bounded)]
    pub strategy: CrawlStrategy,

    /// Hostnames crawled at the same time
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Pause after each request, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Retries for timeouts and retryable status codes
    #[arg(long, default_value_t = 3)]
    pub retry_limit: usize,

    /// Status codes worth retrying (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_RETRYABLE_STATUS_CODES)]
    pub retry_codes: Vec<u16>,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Time budget for a whole hostname, in seconds
    #[arg(long, default_value_t = 300)]
    pub site_timeout_secs: u64,

    /// Links followed from the root page by the bounded strategy
    #[arg(long, default_value_t = 5)]
    pub links: usize,

    /// Recursive strategy: dial every hostname over both https and http
    #[arg(long)]
    pub both_schemes: bool,

    /// Keep button/submit/reset inputs in input_tags
    #[arg(long)]
    pub include_buttons: bool,

    /// Do not POST discovered form fields back to the page
    #[arg(long)]
    pub no_submit: bool,

    /// Subdomain sources in priority order (comma separated)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [SourceKind::Crtsh, SourceKind::Tool, SourceKind::Wordlist]
    )]
    pub sources: Vec<SourceKind>,

    /// Also ask crt.sh for expired certificates
    #[arg(long)]
    pub include_expired: bool,

    /// External enumeration program, run as `<tool> enum -d <domain>`
    #[arg(long, default_value = "amass")]
    pub tool: String,

    /// Wordlist of subdomain labels, one per line
    #[arg(long, default_value = DEFAULT_WORDLIST_PATH)]
    pub wordlist: PathBuf,

    /// Where to write results (default: <domain>_analysis.json)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn to_config(&self) -> CrawlConfig {
        let defaults = CrawlConfig::default();
        CrawlConfig {
            concurrency: self.concurrency,
            request_delay: Duration::from_millis(self.delay_ms),
            max_depth: self.max_depth,
            retryable_status_codes: self.retry_codes.clone(),
            retry_limit: self.retry_limit,
            request_timeout: Duration::from_secs(self.timeout_secs),
            site_timeout: Duration::from_secs(self.site_timeout_secs),
            strategy: self.strategy,
            links_per_site: self.links,
            dial_both_schemes: self.both_schemes,
            exclude_button_inputs: !self.include_buttons,
            submit_forms: !self.no_submit,
            sources: self.sources.clone(),
            include_expired: self.include_expired,
            tool_program: self.tool.clone(),
            wordlist_path: self.wordlist.clone(),
            ..defaults
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| CrawlConfig::default_output_path(&self.domain))
    }
}
