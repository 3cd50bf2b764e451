//! Groups command handler
//!
//! Lists the catalog and edits the set of followed groups.

use super::{CommandHandler, open_selection_store};
use crate::catalog::{self, Group};
use crate::cli::{Commands, GroupActions};
use crate::config::Config;
use crate::selection::{GroupSelection, encode};
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug)]
pub struct GroupsHandler;

impl CommandHandler for GroupsHandler {
    fn execute<'a>(
        &'a self,
        command: &'a Commands,
        config: &'a Config,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let Commands::Groups { action } = command else {
                return Ok(());
            };
            let store = open_selection_store()?;

            match action {
                GroupActions::List { search } => {
                    let path = config.catalog_path()?;
                    let Some(groups) = catalog::load_catalog(&path) else {
                        println!("No group catalog found at {}", path.display());
                        return Ok(());
                    };
                    let selected = store.load();
                    let matches = catalog::search(&groups, search.as_deref().unwrap_or_default());
                    print!("{}", render_groups(&matches, &selected));
                }
                GroupActions::Toggle { id } => {
                    let selected = store.toggle(*id);
                    let state =
                        if selected.contains(id) { "Following" } else { "Stopped following" };
                    println!("{} group {}", state, id);
                    if selected.len() > config.groups.max_selected {
                        println!(
                            "Warning: {} groups selected, the schedule shows at most {}",
                            selected.len(),
                            config.groups.max_selected
                        );
                    }
                }
                GroupActions::Selected => {
                    let selected = store.load();
                    if selected.is_empty() {
                        println!("No groups followed");
                    } else {
                        println!("{}", encode(&selected));
                    }
                }
                GroupActions::Clear => {
                    store.save(&GroupSelection::new());
                    println!("Cleared followed groups");
                }
            }
            Ok(())
        })
    }

    fn can_handle(&self, command: &Commands) -> bool {
        matches!(command, Commands::Groups { .. })
    }
}

/// One line per group, followed ones marked with `*`.
pub fn render_groups(groups: &[&Group], selected: &GroupSelection) -> String {
    if groups.is_empty() {
        return "No matching groups\n".to_string();
    }
    groups
        .iter()
        .map(|group| {
            let mark = if selected.contains(&group.id) { '*' } else { ' ' };
            format!("{} {:>5}  {}\n", mark, group.id, group.name)
        })
        .collect()
}
