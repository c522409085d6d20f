// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Everything that tunes a run lives in one CrawlConfig value that is built
// once (from the CLI, or by hand in tests) and handed to the coordinator.
// Nothing reads settings from globals.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// Browser-like User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Status codes that are worth asking for again
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 8] = [500, 502, 503, 504, 522, 524, 408, 429];

/// Where the wordlist source looks for labels unless told otherwise
pub const DEFAULT_WORDLIST_PATH: &str = "wordlists/subdomains.txt";

/// How far a site crawl is allowed to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CrawlStrategy {
    /// Root page plus the first `links_per_site` same-prefix links it points to
    Bounded,
    /// Breadth-first over same-prefix links up to `max_depth` hops from the root
    Recursive,
}

/// A subdomain source, named so the priority order can be configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Certificate-transparency search (crt.sh)
    Crtsh,
    /// External enumeration tool (amass by default)
    Tool,
    /// Static wordlist of common labels
    Wordlist,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum number of hostnames crawled at the same time
    pub concurrency: usize,
    /// Pause after every request, per site session
    pub request_delay: Duration,
    /// Recursion bound for the recursive strategy
    pub max_depth: usize,
    pub retryable_status_codes: Vec<u16>,
    /// Retries after the first attempt
    pub retry_limit: usize,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    /// Budget for a whole hostname; when it runs out the host is dropped
    pub site_timeout: Duration,
    pub strategy: CrawlStrategy,
    /// Links followed from the root page in bounded mode
    pub links_per_site: usize,
    /// Leave button/submit/reset inputs out of `input_tags`
    pub exclude_button_inputs: bool,
    /// POST the collected form data back to each page
    pub submit_forms: bool,
    /// Characters of the POST response kept in the record
    pub post_excerpt_len: usize,
    /// Scheme used to dial each hostname
    pub scheme: String,
    /// Recursive mode also dials each hostname over the other of http/https
    pub dial_both_schemes: bool,
    pub user_agent: String,
    pub sources: Vec<SourceKind>,
    pub crtsh_endpoint: String,
    pub include_expired: bool,
    pub tool_program: String,
    /// `{domain}` is replaced by the root domain
    pub tool_args: Vec<String>,
    pub wordlist_path: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            concurrency: 8,
            request_delay: Duration::from_millis(500),
            max_depth: 3,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
            retry_limit: 3,
            retry_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
            site_timeout: Duration::from_secs(300),
            strategy: CrawlStrategy::Bounded,
            links_per_site: 5,
            exclude_button_inputs: true,
            submit_forms: true,
            post_excerpt_len: 500,
            scheme: "https".to_string(),
            dial_both_schemes: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: vec![SourceKind::Crtsh, SourceKind::Tool, SourceKind::Wordlist],
            crtsh_endpoint: "https://crt.sh/".to_string(),
            include_expired: false,
            tool_program: "amass".to_string(),
            tool_args: vec!["enum".to_string(), "-d".to_string(), "{domain}".to_string()],
            wordlist_path: PathBuf::from(DEFAULT_WORDLIST_PATH),
        }
    }
}

impl CrawlConfig {
    // The file the coordinator writes for a root domain
    pub fn default_output_path(root_domain: &str) -> PathBuf {
        PathBuf::from(format!("{}_analysis.json", root_domain))
    }
}
