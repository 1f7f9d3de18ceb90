//! Contest acquisition strategies.
//!
//! Each strategy produces the same normalized [`ContestRecord`] shape and is
//! tried by the orchestrator in a fixed order, the first non-empty result
//! winning.
//!
//! # Strategies
//!
//! | Strategy | Module | Method | Notes |
//! |----------|--------|--------|-------|
//! | GraphQL | [`graphql`] | `POST /graphql` | `allContests` + `currentContests` |
//! | Markup | [`markup`] | HTML scraping | Embedded script JSON, then card elements |
//! | Fallback | [`fallback`] | Synthesized | Weekly/biweekly schedule from the clock |
//!
//! # Common Patterns
//!
//! - Live sources turn transport and payload failures into an empty result
//!   and log them; an `Err` from [`ContestSource::attempt`] means something
//!   unexpected happened and the orchestrator jumps straight to the fallback
//! - A single malformed entry is skipped with a warning, its siblings survive

use crate::error::FetchError;
use crate::models::ContestRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod fallback;
pub mod graphql;
pub mod markup;

/// One step of the fallback chain.
#[async_trait]
pub trait ContestSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to produce contests, evaluating status against `now`.
    async fn attempt(&self, now: DateTime<Utc>) -> Result<Vec<ContestRecord>, FetchError>;
}

/// First of `keys` present on a JSON object with a non-null value.
pub(crate) fn first_field<'a>(
    entry: &'a serde_json::Value,
    keys: &[&str],
) -> Option<&'a serde_json::Value> {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .find(|v| !v.is_null())
}

/// Like [`first_field`] but only accepts non-empty strings.
pub(crate) fn first_str<'a>(entry: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| entry.get(*k).and_then(|v| v.as_str()))
        .find(|s| !s.trim().is_empty())
}
