//! Data models for normalized contest listings.
//!
//! Every acquisition strategy produces the same shape, [`ContestRecord`], so
//! callers never need to know which strategy won. Field names on the wire use
//! camelCase to match the JSON schema consumed downstream.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// The only platform this crate knows how to read.
pub const PLATFORM: &str = "LeetCode";

/// Duration used whenever the source does not say how long a contest runs.
pub const DEFAULT_DURATION_MINUTES: i64 = 90;

/// Where a contest sits relative to the moment it was observed.
///
/// Never read from upstream data; always computed by [`ContestStatus::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Past,
}

impl ContestStatus {
    /// `upcoming` if `now < start`, `ongoing` if `start <= now < end`, `past` otherwise.
    pub fn derive(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            ContestStatus::Upcoming
        } else if now < end {
            ContestStatus::Ongoing
        } else {
            ContestStatus::Past
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContestStatus::Upcoming => "upcoming",
            ContestStatus::Ongoing => "ongoing",
            ContestStatus::Past => "past",
        };
        f.write_str(s)
    }
}

/// A single normalized contest.
///
/// Records are plain values: build one with [`crate::normalize::normalize`]
/// or the fallback generator and never mutate it afterwards.
///
/// # Invariants
///
/// * `end_time == start_time + duration` minutes
/// * `status == ContestStatus::derive(start_time, end_time, now)` for the
///   `now` the record was built against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    /// Display title, never empty.
    pub name: String,
    /// Always [`PLATFORM`].
    pub platform: String,
    /// Absolute link to the contest page.
    pub url: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_time: DateTime<Utc>,
    /// Length in minutes.
    pub duration: i64,
    pub status: ContestStatus,
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_status_upcoming_before_start() {
        assert_eq!(
            ContestStatus::derive(at(17, 30), at(19, 0), at(17, 29)),
            ContestStatus::Upcoming
        );
    }

    #[test]
    fn test_status_ongoing_at_exact_start() {
        assert_eq!(
            ContestStatus::derive(at(17, 30), at(19, 0), at(17, 30)),
            ContestStatus::Ongoing
        );
    }

    #[test]
    fn test_status_past_at_exact_end() {
        assert_eq!(
            ContestStatus::derive(at(17, 30), at(19, 0), at(19, 0)),
            ContestStatus::Past
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ContestStatus::Upcoming.to_string(), "upcoming");
        assert_eq!(ContestStatus::Ongoing.to_string(), "ongoing");
        assert_eq!(ContestStatus::Past.to_string(), "past");
    }

    #[test]
    fn test_record_serialization_schema() {
        let start = at(17, 30);
        let record = ContestRecord {
            name: "Weekly Contest 440".to_string(),
            platform: PLATFORM.to_string(),
            url: "https://leetcode.com/contest/weekly-contest-440".to_string(),
            start_time: start,
            end_time: start + Duration::minutes(90),
            duration: 90,
            status: ContestStatus::Upcoming,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "Weekly Contest 440");
        assert_eq!(value["platform"], "LeetCode");
        assert_eq!(value["startTime"], "2025-03-15T17:30:00Z");
        assert_eq!(value["endTime"], "2025-03-15T19:00:00Z");
        assert_eq!(value["duration"], 90);
        assert_eq!(value["status"], "upcoming");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }
}
