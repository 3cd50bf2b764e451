pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod event;
pub mod feed;
pub mod ics;
pub mod schedule;
pub mod selection;
pub mod session;

use anyhow::Result;
use log::*;

/// Runs one CLI command against the on-disk configuration.
pub async fn run(command: cli::Commands) -> Result<()> {
    let config = Config::load()?;
    debug!("Loaded configuration: {:?}", config);
    commands::CommandProcessor::new(config).execute(command).await
}

/// Logs to stderr with a local timestamp. `RUST_LOG` overrides the `info` default.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use event::Event;
pub use feed::{FeedClient, FeedError, FeedFetcher, HttpFeedClient};
pub use ics::{IcsParser, parse_events};
pub use schedule::{ScheduleDay, group_by_day};
pub use selection::{GroupId, GroupSelection, KeyValueStore, SelectionStore};
pub use session::{ScheduleSession, ScheduleState};
