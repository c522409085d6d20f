// src/crawl/mod.rs
// =============================================================================
// This module handles crawling a single hostname.
//
// Features:
// - One browser-like session (cookie jar, retries, polite delay) per host
// - Bounded crawl: root page plus its first few same-prefix links
// - Recursive crawl: breadth-first up to a configurable depth
//
// Rust concepts:
// - Async programming: every request is awaited, never blocks a thread
// - Ownership: each hostname task owns its session outright
// =============================================================================

mod session;
mod site;

pub use session::{FetchedPage, Session};
pub use site::{SiteCrawler, SiteTarget};
