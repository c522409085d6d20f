// src/analyze/mod.rs
// =============================================================================
// This module turns fetched pages into records.
//
// Submodules:
// - records: the persisted data model (PageRecord, InputField, forms...)
// - html: synchronous extraction of fields, forms, CSRF token and links
// - page: the page analyzer, which fetches, extracts and optionally POSTs
// =============================================================================

mod html;
mod page;
mod records;

pub use page::PageAnalyzer;
pub use records::{RunResult, SiteResult};
