use crate::cli::Commands;
use crate::config::{self, Config};
use crate::feed::{FeedFetcher, HttpFeedClient};
use crate::selection::{FileStore, SelectionStore};
use crate::session::ScheduleSession;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

pub mod config_handler;
pub mod groups_handler;
pub mod show_handler;

pub trait CommandHandler: Debug + Send + Sync {
    fn execute<'a>(
        &'a self,
        command: &'a Commands,
        config: &'a Config,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'a>>;
    fn can_handle(&self, command: &Commands) -> bool;
}

#[derive(Debug)]
pub struct CommandProcessor {
    config: Config,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandProcessor {
    pub fn new(config: Config) -> Self {
        let handlers: Vec<Box<dyn CommandHandler>> = vec![
            Box::new(show_handler::ShowHandler),
            Box::new(groups_handler::GroupsHandler),
            Box::new(config_handler::ConfigHandler),
        ];
        Self { config, handlers }
    }

    pub async fn execute(&self, command: Commands) -> Result<()> {
        debug!("Attempting to execute command: {:?}", command);
        for handler in &self.handlers {
            if handler.can_handle(&command) {
                info!("Executing command {:?}", command);
                return match handler.execute(&command, &self.config).await {
                    Ok(()) => {
                        debug!("Command executed successfully");
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("Failed to execute command {:?}: {:?}", command, e);
                        Err(e)
                    }
                };
            }
        }
        warn!("No handler for command {:?}", command);
        Ok(())
    }
}

/// Selection store persisted next to the configuration.
pub fn open_selection_store() -> Result<SelectionStore<FileStore>> {
    Ok(SelectionStore::new(FileStore::in_dir(config::config_dir()?)))
}

/// Session wired to the real feed and the on-disk selection.
pub fn open_session(config: &Config) -> Result<ScheduleSession<HttpFeedClient, FileStore>> {
    let client =
        HttpFeedClient::new(config.feed.timeout()).context("Failed to build HTTP client")?;
    let fetcher = FeedFetcher::new(client, config.feed.base_url.clone(), config.feed.window_days);
    let session = ScheduleSession::new(fetcher, open_selection_store()?, config.feed.tz()?)
        .with_max_selected(config.groups.max_selected);
    Ok(session)
}
