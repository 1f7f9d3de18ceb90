//! The fallback chain.
//!
//! Live sources are tried strictly in order and the first non-empty result is
//! returned. When every live source comes back empty, or when one of them
//! fails in a way it did not handle itself (an `Err` or a panic), the
//! synthesized schedule is returned instead. Callers always get contests.

use crate::models::ContestRecord;
use crate::sources::ContestSource;
use crate::sources::fallback::FallbackGenerator;
use crate::sources::graphql::GraphqlSource;
use crate::sources::markup::MarkupScraper;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument};
use url::Url;

pub struct Orchestrator {
    sources: Vec<Box<dyn ContestSource>>,
    fallback: FallbackGenerator,
}

impl Orchestrator {
    pub fn new(sources: Vec<Box<dyn ContestSource>>, fallback: FallbackGenerator) -> Self {
        Self { sources, fallback }
    }

    /// GraphQL, then markup scraping, then the synthesized schedule.
    pub fn standard(transport: Arc<dyn Transport>, base: &Url) -> Self {
        let base_str = base.as_str().trim_end_matches('/').to_string();
        let sources: Vec<Box<dyn ContestSource>> = vec![
            Box::new(GraphqlSource::new(transport.clone(), base_str.clone())),
            Box::new(MarkupScraper::new(transport, base.clone())),
        ];
        Self::new(sources, FallbackGenerator::new(base_str))
    }

    /// Produce the contest list as seen at `now`. Never empty, never fails.
    #[instrument(level = "info", skip(self))]
    pub async fn produce_contests(&self, now: DateTime<Utc>) -> Vec<ContestRecord> {
        for source in &self.sources {
            let name = source.name();
            info!(source = name, "Trying contest source");

            match AssertUnwindSafe(source.attempt(now)).catch_unwind().await {
                Ok(Ok(contests)) if !contests.is_empty() => {
                    info!(source = name, count = contests.len(), "Contest source succeeded");
                    return contests;
                }
                Ok(Ok(_)) => {
                    info!(source = name, "Contest source returned nothing; falling through");
                }
                Ok(Err(e)) => {
                    error!(source = name, error = %e, "Contest source failed; using fallback");
                    break;
                }
                Err(panic) => {
                    error!(
                        source = name,
                        panic = %panic_message(panic.as_ref()),
                        "Contest source panicked; using fallback"
                    );
                    break;
                }
            }
        }

        let contests = self.fallback.generate(now);
        info!(
            source = self.fallback.name(),
            count = contests.len(),
            "Using fallback contests"
        );
        contests
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
