//! Upstream rate feed abstraction

use crate::core::error::RateError;
use crate::core::rate::RateEntry;
use async_trait::async_trait;

/// Default daily feed, quoted against USD.
pub const DEFAULT_FEED_URL: &str = "https://www.floatrates.com/daily/usd.json";

#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Fetches every record of the feed, mapped to entries in feed order.
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateError>;
}
