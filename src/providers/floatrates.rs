use super::util::with_retry;
use crate::core::config::FeedConfig;
use crate::core::error::RateError;
use crate::core::feed::RateFeed;
use crate::core::rate::RateEntry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// One record of the daily feed. Other fields (`alphaCode`, `inverseRate`, ...)
/// are ignored.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    name: String,
    code: String,
    rate: f64,
    date: String,
}

impl From<FeedRecord> for RateEntry {
    fn from(record: FeedRecord) -> Self {
        RateEntry {
            country: record.name,
            currency_code: record.code,
            rate: record.rate,
            last_update: record.date,
        }
    }
}

/// Maps a feed body (an object keyed by lowercase currency code) to entries,
/// in the order the feed lists them.
pub fn parse_feed(body: &str) -> Result<Vec<RateEntry>, RateError> {
    let records: Map<String, Value> =
        serde_json::from_str(body).map_err(|e| RateError::Parse(e.to_string()))?;
    records
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value::<FeedRecord>(value)
                .map(RateEntry::from)
                .map_err(|e| RateError::Parse(format!("{key}: {e}")))
        })
        .collect()
}

pub struct FloatRatesFeed {
    url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl FloatRatesFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ratewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(FloatRatesFeed {
            url: config.url.clone(),
            client,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }
}

#[async_trait]
impl RateFeed for FloatRatesFeed {
    #[instrument(name = "FloatRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateError> {
        debug!("Requesting rates from {}", self.url);

        let response = with_retry(
            || self.client.get(&self.url).send(),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| RateError::fetch(&self.url, format!("Request error: {e}")))?;

        if !response.status().is_success() {
            return Err(RateError::fetch(
                &self.url,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RateError::fetch(&self.url, format!("Failed to read body: {e}")))?;

        let entries = parse_feed(&text)?;
        debug!(count = entries.len(), "Parsed feed records");
        Ok(entries)
    }
}
