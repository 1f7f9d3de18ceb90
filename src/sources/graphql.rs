//! Structured source: the site's GraphQL endpoint.
//!
//! A single POST asks for both the full contest catalog and the currently
//! running contests. The two lists are concatenated as-is; a contest present
//! in both shows up twice.

use super::{ContestSource, first_str};
use crate::error::FetchError;
use crate::models::ContestRecord;
use crate::normalize::{ContestLink, RawContest, RawStartTime, duration_minutes, normalize};
use crate::transport::Transport;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const CONTEST_LIST_QUERY: &str = r#"
    query getContestList {
        allContests {
            title
            titleSlug
            startTime
            duration
        }
        currentContests {
            title
            titleSlug
            startTime
            duration
        }
    }
"#;

const LIST_KEYS: [&str; 2] = ["allContests", "currentContests"];

/// Fetches contests from `{base}/graphql`.
pub struct GraphqlSource {
    transport: Arc<dyn Transport>,
    base: String,
}

impl GraphqlSource {
    pub fn new(transport: Arc<dyn Transport>, base: impl Into<String>) -> Self {
        Self {
            transport,
            base: base.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/graphql", self.base.trim_end_matches('/'))
    }

    /// Query the endpoint and normalize every usable entry.
    ///
    /// Never fails: transport errors, non-success statuses and payloads
    /// without a `data` object all yield an empty vector.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch(&self, now: DateTime<Utc>) -> Vec<ContestRecord> {
        let endpoint = self.endpoint();
        let body = json!({ "query": CONTEST_LIST_QUERY });

        let payload = match self.transport.post_json(&endpoint, &body).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(%endpoint, error = %e, "GraphQL request failed");
                return Vec::new();
            }
        };

        let Some(entries) = contest_entries(&payload) else {
            warn!(
                payload = %truncate_for_log(&payload.to_string(), 300),
                "No data returned from GraphQL"
            );
            return Vec::new();
        };
        info!(count = entries.len(), "Found contest entries from GraphQL");

        let contests: Vec<ContestRecord> = entries
            .into_iter()
            .filter_map(|entry| match normalize(raw_contest(entry), &self.base, now) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        title = first_str(entry, &["title"]).unwrap_or("<untitled>"),
                        error = %e,
                        "Skipping GraphQL contest entry"
                    );
                    None
                }
            })
            .collect();

        info!(count = contests.len(), "Normalized GraphQL contests");
        contests
    }
}

#[async_trait]
impl ContestSource for GraphqlSource {
    fn name(&self) -> &'static str {
        "graphql"
    }

    async fn attempt(&self, now: DateTime<Utc>) -> Result<Vec<ContestRecord>, FetchError> {
        Ok(self.fetch(now).await)
    }
}

/// Both contest lists under `data`, concatenated.
///
/// `None` when `data` is absent, null or not an object. A missing list is
/// treated as empty.
fn contest_entries(payload: &Value) -> Option<Vec<&Value>> {
    let data = payload.get("data")?.as_object()?;
    let entries = LIST_KEYS
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_array))
        .flatten()
        .collect();
    Some(entries)
}

fn raw_contest(entry: &Value) -> RawContest {
    RawContest {
        title: first_str(entry, &["title"]).map(str::to_string),
        link: first_str(entry, &["titleSlug"]).map(|s| ContestLink::Slug(s.to_string())),
        start: entry.get("startTime").and_then(RawStartTime::from_json),
        duration: duration_minutes(entry.get("duration")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContestStatus;
    use crate::transport::fixtures::FixtureTransport;
    use chrono::{TimeDelta, TimeZone};

    const BASE: &str = "https://leetcode.com";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn entry(n: u32, start: DateTime<Utc>) -> Value {
        json!({
            "title": format!("Weekly Contest {n}"),
            "titleSlug": format!("weekly-contest-{n}"),
            "startTime": start.timestamp(),
            "duration": 90
        })
    }

    fn graphql_source(transport: FixtureTransport) -> (Arc<FixtureTransport>, GraphqlSource) {
        let transport = Arc::new(transport);
        let source = GraphqlSource::new(transport.clone(), BASE);
        (transport, source)
    }

    #[tokio::test]
    async fn test_concatenates_all_and_current_contests() {
        let upcoming = Utc.with_ymd_and_hms(2025, 3, 15, 17, 30, 0).unwrap();
        let running = Utc.with_ymd_and_hms(2025, 3, 10, 11, 30, 0).unwrap();
        let payload = json!({
            "data": {
                "allContests": [entry(440, upcoming), entry(439, running)],
                "currentContests": [entry(439, running)]
            }
        });
        let (transport, source) = graphql_source(FixtureTransport::with_post(payload));

        let contests = source.fetch(now()).await;

        assert_eq!(contests.len(), 3);
        assert_eq!(contests[0].name, "Weekly Contest 440");
        assert_eq!(contests[0].status, ContestStatus::Upcoming);
        assert_eq!(contests[1].status, ContestStatus::Ongoing);
        assert_eq!(contests[1], contests[2]);
        assert_eq!(transport.posts(), 1);
        assert_eq!(
            transport.requested.lock().unwrap().as_slice(),
            ["https://leetcode.com/graphql"]
        );
    }

    #[tokio::test]
    async fn test_single_malformed_entry_is_skipped() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 17, 30, 0).unwrap();
        let mut entries: Vec<Value> = (0..5)
            .map(|i| entry(435 + i, start + TimeDelta::days(7 * i as i64)))
            .collect();
        entries[2].as_object_mut().unwrap().remove("titleSlug");
        let payload = json!({ "data": { "allContests": entries, "currentContests": [] } });
        let (_, source) = graphql_source(FixtureTransport::with_post(payload));

        let contests = source.fetch(now()).await;

        assert_eq!(contests.len(), 4);
        assert!(contests.iter().all(|c| c.name != "Weekly Contest 437"));
    }

    #[tokio::test]
    async fn test_missing_duration_defaults_and_end_time_follows() {
        let start = Utc.with_ymd_and_hms(2025, 3, 15, 17, 30, 0).unwrap();
        let payload = json!({
            "data": {
                "allContests": [{
                    "title": "Weekly Contest 440",
                    "titleSlug": "weekly-contest-440",
                    "startTime": start.timestamp(),
                    "duration": "unknown"
                }]
            }
        });
        let (_, source) = graphql_source(FixtureTransport::with_post(payload));

        let contests = source.fetch(now()).await;

        assert_eq!(contests.len(), 1);
        assert_eq!(contests[0].duration, 90);
        assert_eq!(contests[0].end_time, start + TimeDelta::minutes(90));
    }

    #[tokio::test]
    async fn test_missing_data_yields_empty() {
        let (_, source) = graphql_source(FixtureTransport::with_post(
            json!({ "errors": [{ "message": "rate limited" }] }),
        ));
        assert!(source.fetch(now()).await.is_empty());

        let (_, source) = graphql_source(FixtureTransport::with_post(json!({ "data": null })));
        assert!(source.fetch(now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_yields_empty() {
        let (transport, source) = graphql_source(FixtureTransport::default());
        let result = source.attempt(now()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(transport.posts(), 1);
    }
}
