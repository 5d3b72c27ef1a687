use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::FeedConfig;
use crate::constants::FEED_STATUS_SUCCESS;
use crate::error::{MonitorError, Result};
use crate::types::{FeedResponse, RawRecord};

/// Where sheet rows come from. Implementations hand back the whole envelope;
/// the core is never fed a partially received payload.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short label used in logs and metric labels
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<FeedResponse>;
}

/// Apps-script style HTTP endpoint returning `{ status, data }`
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<FeedResponse> {
        info!("📡 Fetching feed");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!("Received {} bytes", bytes.len());
        decode_feed(&bytes)
    }
}

/// JSON export on disk, either the endpoint envelope or a bare row array
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<FeedResponse> {
        info!("📂 Reading feed file");
        let bytes = tokio::fs::read(&self.path).await?;
        decode_feed(&bytes)
    }
}

/// Build the configured source. A local path takes precedence over a URL.
pub fn source_from_config(config: &FeedConfig) -> Result<Box<dyn FeedSource>> {
    if let Some(path) = config.path.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(Box::new(FileFeedSource::new(path)));
    }
    if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let timeout = Duration::from_secs(config.timeout_seconds);
        return Ok(Box::new(HttpFeedSource::new(url, timeout)?));
    }
    Err(MonitorError::Config(
        "No feed configured: set feed.url or feed.path, or pass --url/--file".to_string(),
    ))
}

/// Envelope as sent, before rows are checked to be objects
#[derive(Deserialize)]
struct WireEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<Value>,
}

/// Parse a feed payload. A bare JSON array is treated as a successful
/// envelope around those rows. Non-object rows are dropped either way.
pub fn decode_feed(bytes: &[u8]) -> Result<FeedResponse> {
    let value: Value = serde_json::from_slice(bytes)?;
    match value {
        Value::Array(items) => Ok(FeedResponse {
            status: FEED_STATUS_SUCCESS.to_string(),
            message: None,
            data: object_rows(items),
        }),
        other => {
            let envelope: WireEnvelope = serde_json::from_value(other)?;
            Ok(FeedResponse {
                status: envelope.status,
                message: envelope.message,
                data: object_rows(envelope.data),
            })
        }
    }
}

fn object_rows(items: Vec<Value>) -> Vec<RawRecord> {
    let total = items.len();
    let rows: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if rows.len() != total {
        warn!("Dropped {} non-object rows from feed", total - rows.len());
    }
    rows
}

/// Rows of a successful envelope, or the status the feed reported
pub fn into_rows(response: FeedResponse) -> Result<Vec<RawRecord>> {
    if response.status.eq_ignore_ascii_case(FEED_STATUS_SUCCESS) {
        Ok(response.data)
    } else {
        Err(MonitorError::Feed {
            status: response.status,
            message: response.message.unwrap_or_else(|| "no message".to_string()),
        })
    }
}
