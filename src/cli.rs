//! Command-line interface definitions.
//!
//! Every option has a default, so running the binary with no arguments
//! queries the live site and prints the contest list as JSON to stdout.

use crate::models::ContestStatus;
use crate::transport::DEFAULT_TIMEOUT;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Fetch LeetCode contests (GraphQL, then page scraping, then a synthesized
/// schedule) and print them as JSON.
///
/// # Examples
///
/// ```sh
/// # Live fetch, printed to stdout
/// contest_feed
///
/// # Only upcoming contests, ordered by start time, written to a file
/// contest_feed --status upcoming --sort -o ./out/contests.json
///
/// # Reproducible run against a pinned clock
/// contest_feed --now 2025-03-10T09:00:00Z
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site root used for the GraphQL endpoint, listing pages and contest links
    #[arg(long, default_value = "https://leetcode.com")]
    pub base_url: String,

    /// Per-request network timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Evaluate contest status against this RFC 3339 instant instead of the clock
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Only emit contests with this status
    #[arg(long, value_enum)]
    pub status: Option<ContestStatus>,

    /// Order contests by start time instead of source order
    #[arg(long)]
    pub sort: bool,

    /// Write JSON to this file instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
