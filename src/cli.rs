use crate::selection::GroupId;
use clap::{Parser, Subcommand};

/// kse-schedule - KSE class schedule in the terminal
#[derive(Debug, Parser)]
#[command(name = "kse-schedule")]
#[command(
    about = "KSE class schedule for the groups you follow, grouped by day",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Command to execute (shows the schedule if not specified)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested command, defaulting to `show`.
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Show { json: false })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Fetch and print the schedule
    Show {
        /// Print the days as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage followed groups
    #[command(alias = "group")]
    Groups {
        #[command(subcommand)]
        action: GroupActions,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum GroupActions {
    /// List groups from the catalog
    List {
        /// Only groups whose name contains this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Follow or unfollow a group
    Toggle {
        /// Group id from the catalog
        #[arg(required = true)]
        id: GroupId,
    },

    /// Show followed group ids
    Selected,

    /// Unfollow every group
    Clear,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigActions {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}
