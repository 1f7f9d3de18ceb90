//! Synthesized contest schedule used when both live sources come back empty.
//!
//! Weekly contests run on Saturdays at 17:30 UTC; a biweekly contest is placed
//! three days before every other weekly one. Numbering starts from fixed
//! baselines, so the names are plausible rather than exact.

use super::ContestSource;
use crate::error::FetchError;
use crate::models::{ContestRecord, ContestStatus, DEFAULT_DURATION_MINUTES, PLATFORM};
use crate::normalize::contest_url;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};
use tracing::{info, instrument};

const ANCHOR_WEEKDAY: Weekday = Weekday::Sat;
const ANCHOR_MINUTE_OF_DAY: i64 = 17 * 60 + 30;
const BIWEEKLY_OFFSET_DAYS: i64 = 3;
const UPCOMING_WEEKS: u32 = 3;
const PAST_WEEKS: u32 = 5;

pub const WEEKLY_BASELINE: u32 = 440;
pub const BIWEEKLY_BASELINE: u32 = 126;

/// Deterministic schedule generator; a pure function of `now`.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    base: String,
    weekly_baseline: u32,
    biweekly_baseline: u32,
}

impl FallbackGenerator {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            weekly_baseline: WEEKLY_BASELINE,
            biweekly_baseline: BIWEEKLY_BASELINE,
        }
    }

    /// Build the schedule around the next anchor Saturday.
    ///
    /// Emits three upcoming weekly contests (with biweekly ones before the
    /// first and third), then five past weekly contests walking backwards
    /// (with biweekly ones before the second and fourth). Entries whose times
    /// fall outside the representable range are left out; the anchor contest
    /// itself is always present, so the result is never empty.
    #[instrument(level = "info", skip(self))]
    pub fn generate(&self, now: DateTime<Utc>) -> Vec<ContestRecord> {
        let anchor = next_anchor(now);
        let mut contests = Vec::with_capacity(12);

        for i in 0..UPCOMING_WEEKS {
            let Some(weekly) = anchor.checked_add_signed(TimeDelta::weeks(i as i64)) else {
                continue;
            };
            contests.extend(self.weekly(self.weekly_baseline + i, weekly, now));

            if i % 2 == 0 {
                contests.extend(
                    biweekly_start(weekly)
                        .and_then(|start| self.biweekly(self.biweekly_baseline + i / 2, start, now)),
                );
            }
        }

        for i in 1..=PAST_WEEKS {
            let Some(weekly) = anchor.checked_sub_signed(TimeDelta::weeks(i as i64)) else {
                continue;
            };
            contests.extend(self.weekly(self.weekly_baseline.saturating_sub(i), weekly, now));

            if i % 2 == 0 {
                contests.extend(biweekly_start(weekly).and_then(|start| {
                    self.biweekly(self.biweekly_baseline.saturating_sub(i / 2), start, now)
                }));
            }
        }

        info!(count = contests.len(), %anchor, "Generated fallback contests");
        contests
    }

    fn weekly(&self, n: u32, start: DateTime<Utc>, now: DateTime<Utc>) -> Option<ContestRecord> {
        self.scheduled(
            format!("Weekly Contest {n}"),
            &format!("weekly-contest-{n}"),
            start,
            now,
        )
    }

    fn biweekly(&self, n: u32, start: DateTime<Utc>, now: DateTime<Utc>) -> Option<ContestRecord> {
        self.scheduled(
            format!("Biweekly Contest {n}"),
            &format!("biweekly-contest-{n}"),
            start,
            now,
        )
    }

    fn scheduled(
        &self,
        name: String,
        slug: &str,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<ContestRecord> {
        let end_time = start_time.checked_add_signed(TimeDelta::minutes(DEFAULT_DURATION_MINUTES))?;
        Some(ContestRecord {
            name,
            platform: PLATFORM.to_string(),
            url: contest_url(&self.base, slug),
            start_time,
            end_time,
            duration: DEFAULT_DURATION_MINUTES,
            status: ContestStatus::derive(start_time, end_time, now),
        })
    }
}

fn biweekly_start(weekly: DateTime<Utc>) -> Option<DateTime<Utc>> {
    weekly.checked_sub_signed(TimeDelta::days(BIWEEKLY_OFFSET_DAYS))
}

#[async_trait]
impl ContestSource for FallbackGenerator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn attempt(&self, now: DateTime<Utc>) -> Result<Vec<ContestRecord>, FetchError> {
        Ok(self.generate(now))
    }
}

/// The first Saturday 17:30 UTC at or after `now`.
///
/// At the very end of the representable range, where no such Saturday
/// exists, the latest one before `now` is returned instead.
pub fn next_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    let target = ANCHOR_WEEKDAY.num_days_from_monday();
    let today = now.weekday().num_days_from_monday();
    let date = now.date_naive();

    let ahead = date
        .checked_add_days(Days::new(u64::from((7 + target - today) % 7)))
        .and_then(anchor_on);

    match ahead {
        Some(anchor) if anchor >= now => anchor,
        Some(anchor) => anchor
            .checked_add_signed(TimeDelta::weeks(1))
            .unwrap_or(anchor),
        None => date
            .checked_sub_days(Days::new(u64::from((7 + today - target) % 7)))
            .and_then(anchor_on)
            .unwrap_or(now),
    }
}

fn anchor_on(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_signed(TimeDelta::minutes(ANCHOR_MINUTE_OF_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BASE: &str = "https://leetcode.com";

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn names(contests: &[ContestRecord], status: ContestStatus) -> Vec<&str> {
        let mut names: Vec<&str> = contests
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.name.as_str())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_monday_schedule_names_and_counts() {
        let contests = FallbackGenerator::new(BASE).generate(monday());

        assert_eq!(contests.len(), 12);
        assert_eq!(
            names(&contests, ContestStatus::Upcoming),
            [
                "Biweekly Contest 126",
                "Biweekly Contest 127",
                "Weekly Contest 440",
                "Weekly Contest 441",
                "Weekly Contest 442",
            ]
        );
        assert_eq!(
            names(&contests, ContestStatus::Past),
            [
                "Biweekly Contest 124",
                "Biweekly Contest 125",
                "Weekly Contest 435",
                "Weekly Contest 436",
                "Weekly Contest 437",
                "Weekly Contest 438",
                "Weekly Contest 439",
            ]
        );
    }

    #[test]
    fn test_monday_schedule_dates_and_urls() {
        let contests = FallbackGenerator::new(BASE).generate(monday());
        let saturday = Utc.with_ymd_and_hms(2025, 3, 15, 17, 30, 0).unwrap();
        let wednesday = Utc.with_ymd_and_hms(2025, 3, 12, 17, 30, 0).unwrap();

        assert_eq!(contests[0].name, "Weekly Contest 440");
        assert_eq!(contests[0].start_time, saturday);
        assert_eq!(contests[0].url, "https://leetcode.com/contest/weekly-contest-440");
        assert_eq!(contests[1].name, "Biweekly Contest 126");
        assert_eq!(contests[1].start_time, wednesday);
        assert_eq!(contests[1].url, "https://leetcode.com/contest/biweekly-contest-126");
        assert_eq!(contests[5].name, "Weekly Contest 439");
        assert_eq!(contests[5].start_time, saturday - TimeDelta::weeks(1));
    }

    #[test]
    fn test_anchor_boundary_exact_time_is_kept() {
        let saturday = Utc.with_ymd_and_hms(2025, 3, 15, 17, 30, 0).unwrap();
        assert_eq!(next_anchor(saturday), saturday);
        assert_eq!(
            next_anchor(saturday + TimeDelta::seconds(1)),
            saturday + TimeDelta::weeks(1)
        );
        assert_eq!(next_anchor(saturday - TimeDelta::seconds(1)), saturday);
    }

    #[test]
    fn test_invariants_hold_for_many_clocks() {
        let generator = FallbackGenerator::new(BASE);
        let start = Utc.with_ymd_and_hms(2024, 12, 28, 0, 0, 0).unwrap();

        for step in 0..400 {
            let now = start + TimeDelta::minutes(97 * step);
            let anchor = next_anchor(now);
            assert!(anchor >= now);
            assert!(anchor - now < TimeDelta::weeks(1));
            assert_eq!(anchor.weekday(), Weekday::Sat);

            let contests = generator.generate(now);
            assert!(!contests.is_empty());
            for c in &contests {
                assert_eq!(c.end_time, c.start_time + TimeDelta::minutes(c.duration));
                assert_eq!(c.status, ContestStatus::derive(c.start_time, c.end_time, now));
                assert_eq!(c.platform, PLATFORM);
            }
        }
    }

    #[test]
    fn test_extreme_clocks_still_produce_a_schedule() {
        let generator = FallbackGenerator::new(BASE);

        for now in [DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC] {
            let contests = generator.generate(now);

            assert!(!contests.is_empty());
            assert!(contests.len() <= 12);
            for c in &contests {
                assert_eq!(c.end_time, c.start_time + TimeDelta::minutes(c.duration));
                assert_eq!(c.status, ContestStatus::derive(c.start_time, c.end_time, now));
                assert_eq!(c.start_time.weekday() == Weekday::Sat, c.name.starts_with("Weekly"));
            }
        }

        let earliest = next_anchor(DateTime::<Utc>::MIN_UTC);
        assert!(earliest >= DateTime::<Utc>::MIN_UTC);
        assert_eq!(earliest.weekday(), Weekday::Sat);

        let latest = next_anchor(DateTime::<Utc>::MAX_UTC);
        assert!(DateTime::<Utc>::MAX_UTC - latest < TimeDelta::weeks(1));
        assert_eq!(latest.weekday(), Weekday::Sat);
    }

    #[tokio::test]
    async fn test_attempt_never_fails() {
        let contests = FallbackGenerator::new(BASE).attempt(monday()).await.unwrap();
        assert_eq!(contests.len(), 12);
    }
}
