pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::list::{SortKey, ViewOptions};
use crate::core::RateStore;
use crate::core::config::AppConfig;
use crate::providers::floatrates::FloatRatesFeed;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Show {
        search: Option<String>,
        sort: SortKey,
        descending: bool,
        offline: bool,
    },
    Refresh,
    Watch {
        search: Option<String>,
        interval: Option<Duration>,
    },
    Clear,
}

/// Builds the single rate store for this process from the config.
pub fn build_store(config: &AppConfig, ephemeral: bool) -> Result<Arc<RateStore>> {
    let feed = FloatRatesFeed::new(&config.feed)?;
    let storage = store::open_store(config, ephemeral)?;
    Ok(Arc::new(RateStore::new(Arc::new(feed), storage)))
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    ephemeral: bool,
) -> Result<()> {
    info!("ratewatch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = build_store(&config, ephemeral)?;

    match command {
        AppCommand::Show {
            search,
            sort,
            descending,
            offline,
        } => {
            let options = ViewOptions {
                search,
                sort,
                descending,
            };
            cli::list::run(&store, &options, offline).await
        }
        AppCommand::Refresh => {
            let snapshot = store.try_refresh().await?;
            println!("Fetched {} rates", snapshot.len());
            Ok(())
        }
        AppCommand::Watch { search, interval } => {
            let options = ViewOptions {
                search,
                ..ViewOptions::default()
            };
            let interval = interval.unwrap_or_else(|| config.refresh_interval());
            cli::watch::run(store, &options, interval).await
        }
        AppCommand::Clear => {
            store.clear_stored().await?;
            println!("Cleared cached rates");
            Ok(())
        }
    }
}
