//! Markup source: scrape the public contest listing page.
//!
//! The page is fetched with browser headers and scanned in two passes, the
//! first non-empty pass winning:
//!
//! 1. **Embedded data**: inline `<script>` blocks that assign a JSON object or
//!    array of contests (`window.pageData = {...};` and friends)
//! 2. **Contest cards**: known card selectors, each card giving a title, a
//!    link, a start time and optionally a duration
//!
//! If the listing page parses but yields nothing, the calendar page is tried
//! the same way before giving up.
//!
//! # URL Pattern
//!
//! Card links are usually relative (`/contest/weekly-contest-440`) and are
//! resolved against the configured base URL, which always ends in `/` so a
//! base with a path keeps it.

use super::{ContestSource, first_field, first_str};
use crate::error::FetchError;
use crate::models::ContestRecord;
use crate::normalize::{
    ContestLink, RawContest, RawStartTime, duration_minutes, normalize, parse_timestamp,
};
use crate::transport::Transport;
use crate::utils::slugify_title;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Listing page first, calendar page second.
const LISTING_PATHS: [&str; 2] = ["contest/", "contest/calendar/"];

static SCRIPT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?s)window\.pageData\s*=\s*(\{.*?\});",
        r"(?s)window\.CONTEST_DATA\s*=\s*(\{.*?\});",
        r"(?s)contests\s*:\s*(\[.*?\])",
        r"(?s)initialState.*?contests.*?(\[.*?\])",
        r#"(?s)"contestData"\s*:\s*(\{.*?\})"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CARD_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    [
        ".contest-card",
        ".contest-container .contest-card",
        ".contest-list .contest",
        r#"[data-cy="contest-card"]"#,
        ".rounded-lg.shadow-md",
        ".contest-info",
        ".contest-overview .items-center",
    ]
    .iter()
    .map(|css| (*css, Selector::parse(css).unwrap()))
    .collect()
});

static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card-title, .contest-title, h4").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static START_TIME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".contest-start-time, [data-start-time], .start-time, time, [datetime]")
        .unwrap()
});
static DURATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".duration, .contest-duration").unwrap());

static TITLE_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Bi)?[Ww]eekly Contest \d+").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());
static DATE_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}/\d{1,2}/\d{4}|\d{4}-\d{2}-\d{2})").unwrap());
static CLOCK_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2})\s*([AaPp][Mm])").unwrap());

const TIME_ATTRS: [&str; 4] = ["start-time", "data-start-time", "datetime", "data-value"];

/// Scrapes `{base}/contest/` (and the calendar page as a second chance).
pub struct MarkupScraper {
    transport: Arc<dyn Transport>,
    base: Url,
}

impl MarkupScraper {
    /// `base` is treated as a directory: `https://host/mirror` and
    /// `https://host/mirror/` both scrape `https://host/mirror/contest/`.
    pub fn new(transport: Arc<dyn Transport>, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { transport, base }
    }

    /// Fetch and scan the listing pages.
    ///
    /// Never fails: a page that cannot be fetched ends the attempt with an
    /// empty vector.
    #[instrument(level = "info", skip_all)]
    pub async fn scrape(&self, now: DateTime<Utc>) -> Vec<ContestRecord> {
        for path in LISTING_PATHS {
            let page_url = match self.base.join(path) {
                Ok(u) => u,
                Err(e) => {
                    error!(%path, error = %e, "Cannot build listing URL");
                    return Vec::new();
                }
            };

            let html = match self.transport.get_text(page_url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    error!(url = %page_url, error = %e, "Listing page fetch failed");
                    return Vec::new();
                }
            };

            let contests = extract_contests(&html, &self.base, now);
            if !contests.is_empty() {
                info!(count = contests.len(), url = %page_url, "Scraped contests from page");
                return contests;
            }
            info!(url = %page_url, "No contests found on page");
        }
        Vec::new()
    }
}

#[async_trait]
impl ContestSource for MarkupScraper {
    fn name(&self) -> &'static str {
        "markup"
    }

    async fn attempt(&self, now: DateTime<Utc>) -> Result<Vec<ContestRecord>, FetchError> {
        Ok(self.scrape(now).await)
    }
}

/// Scan one HTML document: embedded script data first, then contest cards.
pub fn extract_contests(html: &str, base: &Url, now: DateTime<Utc>) -> Vec<ContestRecord> {
    let document = Html::parse_document(html);

    let contests = extract_from_scripts(&document, base, now);
    if !contests.is_empty() {
        debug!(count = contests.len(), "Found contests in script data");
        return contests;
    }

    let contests = extract_from_cards(&document, base, now);
    if !contests.is_empty() {
        debug!(count = contests.len(), "Found contests in card elements");
    }
    contests
}

fn extract_from_scripts(document: &Html, base: &Url, now: DateTime<Utc>) -> Vec<ContestRecord> {
    for script in document.select(&SCRIPT) {
        let content: String = script.text().collect();
        if content.trim().is_empty() {
            continue;
        }

        for pattern in SCRIPT_PATTERNS.iter() {
            let Some(captured) = pattern.captures(&content).and_then(|c| c.get(1)) else {
                continue;
            };
            let data: Value = match serde_json::from_str(captured.as_str()) {
                Ok(data) => data,
                Err(e) => {
                    warn!(pattern = pattern.as_str(), error = %e, "Unparseable script data");
                    continue;
                }
            };
            let Some(list) = contest_list(&data) else {
                continue;
            };

            let contests: Vec<ContestRecord> = list
                .iter()
                .filter_map(|entry| match normalize(embedded_contest(entry), base.as_str(), now) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(error = %e, "Skipping embedded contest entry");
                        None
                    }
                })
                .collect();
            if !contests.is_empty() {
                return contests;
            }
        }
    }
    Vec::new()
}

/// Locate the contest array inside parsed script data.
fn contest_list(data: &Value) -> Option<&Vec<Value>> {
    if let Some(list) = data.as_array() {
        return Some(list);
    }
    data.get("contests")
        .and_then(Value::as_array)
        .or_else(|| data.get("contestData").and_then(Value::as_array))
        .or_else(|| {
            data.get("data")
                .and_then(|d| d.get("contests"))
                .and_then(Value::as_array)
        })
}

fn embedded_contest(entry: &Value) -> RawContest {
    let title = first_str(entry, &["title", "name", "contestTitle"]);
    let slug = first_str(entry, &["titleSlug", "slug"])
        .map(str::to_string)
        .or_else(|| title.map(slugify_title));

    RawContest {
        title: title.map(str::to_string),
        link: slug.map(ContestLink::Slug),
        start: first_field(entry, &["startTime", "startDate"]).and_then(RawStartTime::from_json),
        duration: duration_minutes(entry.get("duration")),
    }
}

fn extract_from_cards(document: &Html, base: &Url, now: DateTime<Utc>) -> Vec<ContestRecord> {
    for (css, selector) in CARD_SELECTORS.iter() {
        let cards: Vec<ElementRef<'_>> = document.select(selector).collect();
        if cards.is_empty() {
            continue;
        }
        debug!(selector = css, count = cards.len(), "Matched contest card elements");

        let contests: Vec<ContestRecord> = cards
            .into_iter()
            .filter_map(|card| {
                let raw = card_contest(card, base);
                match normalize(raw, base.as_str(), now) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(selector = css, error = %e, "Skipping contest card");
                        None
                    }
                }
            })
            .collect();
        if !contests.is_empty() {
            return contests;
        }
    }
    Vec::new()
}

fn card_contest(card: ElementRef<'_>, base: &Url) -> RawContest {
    let card_text = collapsed_text(card);

    let title = card
        .select(&TITLE)
        .next()
        .map(collapsed_text)
        .filter(|t| !t.is_empty())
        .or_else(|| TITLE_IN_TEXT.find(&card_text).map(|m| m.as_str().to_string()));

    let link = card
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.join(href.trim()).ok())
        .map(|u| ContestLink::Url(u.to_string()));

    let duration = card
        .select(&DURATION)
        .next()
        .map(collapsed_text)
        .and_then(|text| DIGITS.captures(&text).map(|c| c[1].to_string()))
        .and_then(|digits| digits.parse::<i64>().ok());

    RawContest {
        title,
        link,
        start: card_start_time(card, &card_text),
        duration: duration_minutes(duration.map(Value::from).as_ref()),
    }
}

/// Start time from the card's time element, or a date found in its text.
fn card_start_time(card: ElementRef<'_>, card_text: &str) -> Option<RawStartTime> {
    let from_element = card.select(&START_TIME).next().and_then(|el| {
        let attr = TIME_ATTRS
            .iter()
            .filter_map(|name| el.value().attr(name))
            .find(|v| !v.trim().is_empty());
        match attr {
            Some(value) => RawStartTime::from_text(value),
            None => RawStartTime::from_text(&collapsed_text(el)),
        }
    });
    if let Some(start) = from_element.filter(|s| s.resolve().is_ok()) {
        return Some(start);
    }

    let date = DATE_IN_TEXT.captures(card_text)?.get(1)?.as_str().to_string();
    let text = match CLOCK_IN_TEXT.captures(card_text) {
        Some(c) => format!("{} {} {}", date, &c[1], c[2].to_uppercase()),
        None => date,
    };
    parse_timestamp(&text).map(|_| RawStartTime::Text(text))
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
