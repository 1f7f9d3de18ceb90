//! JSON output of the contest list.
//!
//! The document is a bare array of records in the schema of
//! [`ContestRecord`], pretty-printed with two-space indentation.
//!
//! # Selection
//!
//! By default records are emitted in the order the winning source produced
//! them. A status filter and a stable sort by start time can be applied on
//! request.

use crate::models::{ContestRecord, ContestStatus};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Apply the optional status filter and start-time ordering.
pub fn select(
    contests: Vec<ContestRecord>,
    status: Option<ContestStatus>,
    sort_by_start: bool,
) -> Vec<ContestRecord> {
    let mut selected: Vec<ContestRecord> = contests
        .into_iter()
        .filter(|c| status.is_none_or(|s| c.status == s))
        .collect();
    if sort_by_start {
        selected.sort_by_key(|c| c.start_time);
    }
    selected
}

/// Serialize contests as an indented JSON array.
pub fn render(contests: &[ContestRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(contests)
}

/// Write the rendered contests to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_contests(contests: &[ContestRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = render(contests)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(count = contests.len(), "Wrote contests JSON");
    Ok(())
}
