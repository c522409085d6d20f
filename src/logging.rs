// src/logging.rs
// =============================================================================
// Logger set-up.
//
// Diagnostics go to stderr through the `log` facade with env_logger behind
// it, so stdout stays clean for the final summary. RUST_LOG is read first;
// the --log-level flag then overrides the level for this crate.
// =============================================================================

use anyhow::{Context, Result};
use log::LevelFilter;

pub fn init_logger(level: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // html5ever complains loudly about every malformed page we parse
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("form_scout", level);
    builder.format_timestamp_secs();

    builder.try_init().context("Failed to initialize logger")
}
