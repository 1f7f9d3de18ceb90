//! Network access behind an injectable trait.
//!
//! Sources never touch `reqwest` directly; they talk to a [`Transport`].
//! Production code uses [`HttpTransport`], tests substitute canned fixtures.
//!
//! # Request Policy
//!
//! - One request per call, no retries
//! - Fixed per-request timeout (10 seconds unless configured otherwise)
//! - Browser-like `User-Agent`, since the site may reject other clients
//! - Any non-2xx status is reported as [`FetchError::Status`]

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// User agent presented to the contest site.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal HTTP surface the sources need.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and decode the JSON response.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError>;

    /// GET a page and return its body as text.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Transport`] backed by a `reqwest` client.
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    fn check_status(res: Response, url: &str) -> Result<Response, FetchError> {
        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else {
            warn!(%url, status = status.as_u16(), "Non-success response");
            Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, body))]
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError> {
        let t0 = Instant::now();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let res = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        let res = Self::check_status(res, url)?;
        let value = res.json::<Value>().await?;

        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "POST completed");
        Ok(value)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let res = self.client.get(url).headers(headers).send().await?;
        let res = Self::check_status(res, url)?;
        let body = res.text().await?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = body.len(),
            "GET completed"
        );
        Ok(body)
    }
}
