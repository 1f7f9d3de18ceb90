//! # Contest Feed
//!
//! Retrieves the LeetCode contest list as normalized JSON records, tolerating
//! an unreliable upstream by falling back through three strategies.
//!
//! ## Usage
//!
//! ```sh
//! contest_feed > contests.json
//! ```
//!
//! ## Architecture
//!
//! A single pipeline, tried in order until one step yields contests:
//! 1. **GraphQL**: `allContests` + `currentContests` from the site's API
//! 2. **Markup**: embedded script data or contest cards on the listing page
//! 3. **Fallback**: a weekly/biweekly schedule synthesized from the clock
//!
//! Every record carries a status derived from its start/end time against a
//! single `now`, so the output is internally consistent.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod error;
mod models;
mod normalize;
mod orchestrator;
mod outputs;
mod sources;
mod transport;
mod utils;

use cli::Cli;
use orchestrator::Orchestrator;
use outputs::json;
use transport::HttpTransport;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr, stdout carries the JSON) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let base = Url::parse(&args.base_url)?;
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(args.timeout_secs))?);
    let orchestrator = Orchestrator::standard(transport, &base);

    let now = args.now.unwrap_or_else(Utc::now);
    info!(%base, %now, "Fetching contests");

    let contests = orchestrator.produce_contests(now).await;
    if let Some(status) = args.status {
        info!(%status, "Keeping only contests with status");
    }
    let contests = json::select(contests, args.status, args.sort);

    match &args.output {
        Some(path) => json::write_contests(&contests, path).await?,
        None => println!("{}", json::render(&contests)?),
    }

    let elapsed = start_time.elapsed();
    info!(
        count = contests.len(),
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );

    Ok(())
}
