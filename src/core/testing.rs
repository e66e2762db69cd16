//! Test doubles shared by the core unit tests

use crate::core::error::RateError;
use crate::core::feed::RateFeed;
use crate::core::rate::RateEntry;
use crate::core::storage::KeyValueStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn entry(country: &str, code: &str, rate: f64) -> RateEntry {
    RateEntry {
        country: country.to_string(),
        currency_code: code.to_string(),
        rate,
        last_update: "2024-01-01T00:00:00Z".to_string(),
    }
}

pub fn eur_jpy() -> Vec<RateEntry> {
    vec![entry("Japan", "JPY", 148.5), entry("Eurozone", "EUR", 0.92)]
}

pub struct MockFeed {
    response: Mutex<Result<Vec<RateEntry>, RateError>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl MockFeed {
    pub fn new(entries: Vec<RateEntry>) -> Self {
        Self {
            response: Mutex::new(Ok(entries)),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond_with(&self, response: Result<Vec<RateEntry>, RateError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateFeed for MockFeed {
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}

/// Storage that reads nothing and refuses every write.
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<()> {
        Err(anyhow!("storage is read-only"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("storage is read-only"))
    }
}
