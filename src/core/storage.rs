//! Durable key-value storage abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Key under which the latest snapshot is persisted.
pub const STORAGE_KEY: &str = "currency-storage";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
