use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratewatch::cli::list::SortKey;
use ratewatch::core::log::init_logging;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Keep rates in memory only, ignoring the on-disk cache
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display rates, refreshing them first
    Show {
        /// Filter by country or currency code
        #[arg(short, long)]
        search: Option<String>,
        /// Column to sort by
        #[arg(long, value_enum, default_value_t = SortKey::Rate)]
        sort: SortKey,
        /// Sort in descending order
        #[arg(long)]
        desc: bool,
        /// Show cached rates without fetching
        #[arg(long)]
        offline: bool,
    },
    /// Fetch and cache the latest rates
    Refresh,
    /// Refresh periodically and keep the list on screen
    Watch {
        /// Filter by country or currency code
        #[arg(short, long)]
        search: Option<String>,
        /// Seconds between refreshes (overrides the config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Remove the cached rates
    Clear,
}

impl From<Commands> for ratewatch::AppCommand {
    fn from(cmd: Commands) -> ratewatch::AppCommand {
        match cmd {
            Commands::Show {
                search,
                sort,
                desc,
                offline,
            } => ratewatch::AppCommand::Show {
                search,
                sort,
                descending: desc,
                offline,
            },
            Commands::Refresh => ratewatch::AppCommand::Refresh,
            Commands::Watch { search, interval } => ratewatch::AppCommand::Watch {
                search,
                interval: interval.map(Duration::from_secs),
            },
            Commands::Clear => ratewatch::AppCommand::Clear,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratewatch::cli::setup::setup(),
        Some(cmd) => {
            ratewatch::run_command(cmd.into(), cli.config_path.as_deref(), cli.ephemeral).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
