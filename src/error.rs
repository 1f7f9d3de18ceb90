use thiserror::Error;

/// Failure while talking to the contest site.
///
/// Live sources turn these into an empty result. One that escapes a source
/// sends the orchestrator straight to the fallback schedule.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Why a single raw contest entry could not become a record.
///
/// Only ever skips the offending entry; siblings are still processed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing title")]
    MissingTitle,

    #[error("missing slug or link")]
    MissingLink,

    #[error("missing start time")]
    MissingStartTime,

    #[error("unparseable start time: {0}")]
    BadStartTime(String),

    #[error("duration out of range: {0} minutes")]
    BadDuration(i64),
}
