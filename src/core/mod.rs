//! Core rate synchronization: data model, store and its collaborators

pub mod config;
pub mod error;
pub mod feed;
pub mod log;
pub mod periodic;
pub mod rate;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for cleaner imports
pub use error::RateError;
pub use feed::RateFeed;
pub use periodic::RefreshHandle;
pub use rate::{RateEntry, RateSnapshot};
pub use storage::KeyValueStore;
pub use store::{RateStore, Subscription};
