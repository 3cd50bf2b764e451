//! Config command handler
//!
//! Prints the effective configuration or where it lives.

use super::CommandHandler;
use crate::cli::{Commands, ConfigActions};
use crate::config::{Config, get_config_path};
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug)]
pub struct ConfigHandler;

impl CommandHandler for ConfigHandler {
    fn execute<'a>(
        &'a self,
        command: &'a Commands,
        config: &'a Config,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            match command {
                Commands::Config { action: ConfigActions::Show } => {
                    print!("{}", toml::to_string_pretty(config)?);
                }
                Commands::Config { action: ConfigActions::Path } => {
                    println!("{}", get_config_path()?.display());
                }
                _ => {}
            }
            Ok(())
        })
    }

    fn can_handle(&self, command: &Commands) -> bool {
        matches!(command, Commands::Config { .. })
    }
}
