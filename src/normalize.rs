//! Field normalization shared by every acquisition strategy.
//!
//! Sources hand over loosely-typed fields (epoch numbers, ISO strings,
//! slugs, relative links, durations as numbers or text) and get back a
//! [`ContestRecord`] with the end time and status already derived. Keeping
//! this in one place guarantees identical status semantics everywhere.
//!
//! All timestamps are UTC. Naive text timestamps are read as UTC too.

use crate::error::NormalizeError;
use crate::models::{ContestRecord, ContestStatus, DEFAULT_DURATION_MINUTES, PLATFORM};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A start time as found upstream, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStartTime {
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// Any textual timestamp; see [`parse_timestamp`].
    Text(String),
}

impl RawStartTime {
    /// Read a start time out of a JSON field.
    ///
    /// Numbers are epochs (fractions are dropped). Strings made only of digits
    /// are epochs too; anything else is kept as text for later parsing.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(RawStartTime::Epoch),
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }

    /// Same rules as [`RawStartTime::from_json`] for a bare string, e.g. an HTML attribute.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            return text.parse().ok().map(RawStartTime::Epoch);
        }
        Some(RawStartTime::Text(text.to_string()))
    }

    pub fn resolve(&self) -> Result<DateTime<Utc>, NormalizeError> {
        match self {
            RawStartTime::Epoch(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| NormalizeError::BadStartTime(secs.to_string())),
            RawStartTime::Text(text) => {
                parse_timestamp(text).ok_or_else(|| NormalizeError::BadStartTime(text.clone()))
            }
        }
    }
}

/// Parse a textual timestamp.
///
/// Accepts RFC 3339 (`Z` or an explicit offset), naive ISO-like date-times,
/// `12h` clock forms with `AM`/`PM`, and bare dates (taken as midnight).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let upper = text.to_uppercase();
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&upper, fmt) {
            return Some(naive.and_utc());
        }
    }

    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Duration in minutes from an optional JSON field.
///
/// Integers, floats (truncated) and numeric strings are accepted. Anything
/// absent, non-numeric or negative falls back to 90.
pub fn duration_minutes(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    };
    parsed
        .filter(|m| *m >= 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// How a raw entry points at its contest page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContestLink {
    /// Path segment after `/contest/`.
    Slug(String),
    /// Already absolute.
    Url(String),
}

/// Loosely-typed fields for one contest, as pulled from any source.
#[derive(Debug, Clone)]
pub struct RawContest {
    pub title: Option<String>,
    pub link: Option<ContestLink>,
    pub start: Option<RawStartTime>,
    pub duration: i64,
}

/// `{base}/contest/{slug}`
pub fn contest_url(base: &str, slug: &str) -> String {
    format!("{}/contest/{}", base.trim_end_matches('/'), slug)
}

/// Turn a [`RawContest`] into a [`ContestRecord`] evaluated against `now`.
///
/// # Errors
///
/// Fails when the title or link is missing or blank, when there is no start
/// time, or when the start time cannot be interpreted.
pub fn normalize(
    raw: RawContest,
    base: &str,
    now: DateTime<Utc>,
) -> Result<ContestRecord, NormalizeError> {
    let name = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(NormalizeError::MissingTitle)?;

    let url = match raw.link {
        Some(ContestLink::Slug(slug)) if !slug.trim().is_empty() => contest_url(base, slug.trim()),
        Some(ContestLink::Url(url)) if !url.trim().is_empty() => url.trim().to_string(),
        _ => return Err(NormalizeError::MissingLink),
    };

    let start_time = raw.start.ok_or(NormalizeError::MissingStartTime)?.resolve()?;
    let duration = raw.duration;
    let end_time = TimeDelta::try_minutes(duration)
        .and_then(|d| start_time.checked_add_signed(d))
        .ok_or(NormalizeError::BadDuration(duration))?;

    Ok(ContestRecord {
        name,
        platform: PLATFORM.to_string(),
        url,
        start_time,
        end_time,
        duration,
        status: ContestStatus::derive(start_time, end_time, now),
    })
}
