//! The rate store: single owner of the published snapshot.

use crate::core::error::RateError;
use crate::core::feed::RateFeed;
use crate::core::rate::RateSnapshot;
use crate::core::storage::{KeyValueStore, STORAGE_KEY};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Owns the current [`RateSnapshot`] and keeps a durable copy of it.
///
/// Readers get the snapshot as an `Arc` and never observe a partial update.
/// Refreshes and loads are serialized, so the snapshot seen after a refresh
/// completes is exactly the one that refresh produced.
pub struct RateStore {
    feed: Arc<dyn RateFeed>,
    storage: Arc<dyn KeyValueStore>,
    published: watch::Sender<Arc<RateSnapshot>>,
    refresh_lock: Mutex<()>,
}

/// Keeps a snapshot callback registered until dropped.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl RateStore {
    pub fn new(feed: Arc<dyn RateFeed>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (published, _) = watch::channel(Arc::new(RateSnapshot::empty()));
        Self {
            feed,
            storage,
            published,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<RateSnapshot> {
        self.published.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<RateSnapshot>> {
        self.published.subscribe()
    }

    /// Calls `on_change` with every snapshot published after this call.
    ///
    /// A slow callback only sees the latest snapshot once it catches up.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the callback is
    /// driven by a spawned task.
    pub fn subscribe<F>(&self, mut on_change: F) -> Subscription
    where
        F: FnMut(Arc<RateSnapshot>) + Send + 'static,
    {
        let mut rx = self.published.subscribe();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                on_change(snapshot);
            }
        });
        Subscription { task }
    }

    /// Publishes the durable copy, if there is a readable one.
    #[instrument(name = "LoadStoredRates", skip(self))]
    pub async fn load_stored(&self) -> Arc<RateSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        match self.read_stored().await {
            Ok(Some(snapshot)) => {
                info!(count = snapshot.len(), "Loaded stored rates");
                self.publish(snapshot)
            }
            Ok(None) => {
                debug!("No stored rates yet");
                self.current()
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored rates");
                self.current()
            }
        }
    }

    /// Fetches fresh rates, publishes and persists them.
    ///
    /// Failures are logged and the previous snapshot is returned.
    pub async fn refresh(&self) -> Arc<RateSnapshot> {
        match self.try_refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Rate refresh failed, keeping previous snapshot");
                self.current()
            }
        }
    }

    /// Like [`RateStore::refresh`], but hands fetch and parse failures back to
    /// the caller. Waits for any refresh already in flight.
    pub async fn try_refresh(&self) -> Result<Arc<RateSnapshot>, RateError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refreshes unless another refresh holds the lock. Returns `None` when
    /// skipped or failed.
    pub(crate) async fn refresh_if_idle(&self) -> Option<Arc<RateSnapshot>> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            debug!("Refresh already in flight, skipping");
            return None;
        };
        match self.refresh_locked().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!(error = %e, "Rate refresh failed, keeping previous snapshot");
                None
            }
        }
    }

    pub async fn clear_stored(&self) -> Result<()> {
        self.storage.remove(STORAGE_KEY).await?;
        info!("Removed stored rates");
        Ok(())
    }

    async fn refresh_locked(&self) -> Result<Arc<RateSnapshot>, RateError> {
        let entries = self.feed.fetch_rates().await?;
        let snapshot = RateSnapshot::from_entries(entries)?;
        debug!(count = snapshot.len(), "Fetched rates");

        let published = self.publish(snapshot);
        if let Err(e) = self.persist(&published).await {
            error!(error = %e, "Failed to persist rates, in-memory snapshot stays current");
        }
        Ok(published)
    }

    async fn read_stored(&self) -> Result<Option<RateSnapshot>, RateError> {
        let bytes = self
            .storage
            .get(STORAGE_KEY)
            .await
            .map_err(|e| RateError::StorageRead(format!("{e:#}")))?;
        bytes.map(|b| RateSnapshot::from_json(&b)).transpose()
    }

    async fn persist(&self, snapshot: &RateSnapshot) -> Result<(), RateError> {
        let bytes = snapshot.to_json()?;
        self.storage
            .put(STORAGE_KEY, bytes)
            .await
            .map_err(|e| RateError::StorageWrite(format!("{e:#}")))
    }

    fn publish(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.published.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}
