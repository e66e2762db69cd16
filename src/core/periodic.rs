//! Cancellable periodic refresh

use crate::core::store::RateStore;
use anyhow::{Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Handle to a running periodic refresh task.
///
/// Call [`RefreshHandle::stop`] to end it and wait for it. Dropping the handle
/// also ends the task, without waiting. A refresh already in flight always
/// runs to completion and publishes.
pub struct RefreshHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Periodic refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl RateStore {
    /// Refreshes now and then once per `period` until the handle is stopped.
    ///
    /// Ticks that land while a refresh is still running are skipped.
    pub fn start_periodic_refresh(self: &Arc<Self>, period: Duration) -> Result<RefreshHandle> {
        if period.is_zero() {
            bail!("Refresh interval must be greater than zero");
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(?period, "Periodic refresh started");

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        if let Some(snapshot) = store.refresh_if_idle().await {
                            debug!(count = snapshot.len(), "Periodic refresh published");
                        }
                    }
                }
            }

            info!("Periodic refresh stopped");
        });

        Ok(RefreshHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}
