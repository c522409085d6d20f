// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Resolve subdomains and crawl them (see run.rs)
// 4. Write <domain>_analysis.json and print a short summary
// 5. Exit with proper code (0 = done, even with partial failures,
//    1 = bad invocation, 2 = could not write results)
// =============================================================================

mod analyze; // src/analyze/ - page records and surface extraction
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl configuration
mod crawl; // src/crawl/ - per-host sessions and crawl strategies
mod error; // src/error.rs - fetch and resolver failures
mod logging; // src/logging.rs - env_logger set-up
mod resolve; // src/resolve/ - subdomain sources
mod run; // src/run.rs - the run coordinator

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

use cli::Cli;
use resolve::Hostname;
use run::Coordinator;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap prints usage along with the error
            let _ = e.print();
            return Ok(match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            });
        }
    };

    if let Err(e) = Hostname::root(&cli.domain) {
        eprintln!("{}\n\nUsage: form-scout <DOMAIN> [MAX_DEPTH]", e);
        return Ok(1);
    }

    logging::init_logger(cli.log_level)?;

    let config = cli.to_config();
    let output = cli.output_path();

    println!("🔍 Scanning {}", cli.domain);
    let coordinator = Coordinator::new(config)?;
    let results = coordinator.run(&cli.domain).await?;

    run::write_results(&output, &results)?;

    let pages: usize = results.values().map(Vec::len).sum();
    println!("📊 {} host(s), {} page(s)", results.len(), pages);
    println!("💾 Results saved to {}", output.display());

    Ok(0)
}
