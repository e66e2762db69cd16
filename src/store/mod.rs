//! Storage backends for the rate snapshot

pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::storage::KeyValueStore;
use anyhow::Result;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;

/// Opens the configured backend: fjall under `<data_path>/cache`, or memory
/// when `ephemeral` is set.
pub fn open_store(config: &AppConfig, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let cache_dir = config.default_data_path()?.join("cache");
    Ok(Arc::new(DiskStore::open(&cache_dir)?))
}
