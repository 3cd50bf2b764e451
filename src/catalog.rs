//! The list of groups a user can follow.
//!
//! One group per line: `<id> : <name>`.

use crate::selection::GroupId;
use log::{debug, error, info};
use serde::Serialize;
use std::fs;
use std::path::Path;

const SEPARATOR: &str = " : ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Parses one catalog line, or `None` when it does not have the `<id> : <name>` shape.
pub fn parse_line(line: &str) -> Option<Group> {
    let parts: Vec<&str> = line.split(SEPARATOR).collect();
    if parts.len() != 2 {
        return None;
    }
    let id = parts[0].trim().parse().ok()?;
    Some(Group { id, name: parts[1].trim().to_string() })
}

/// Parses a whole catalog, skipping malformed lines.
pub fn parse_catalog(content: &str) -> Vec<Group> {
    content
        .lines()
        .filter_map(|line| {
            let group = parse_line(line);
            if group.is_none() && !line.trim().is_empty() {
                debug!("Skipping catalog line '{}'", line);
            }
            group
        })
        .collect()
}

/// Reads the catalog file. An unreadable file yields `None`.
pub fn load_catalog(path: &Path) -> Option<Vec<Group>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let groups = parse_catalog(&content);
            info!("Loaded {} groups from {}", groups.len(), path.display());
            Some(groups)
        }
        Err(e) => {
            error!("Error reading file {}: {}", path.display(), e);
            None
        }
    }
}

/// Groups whose name contains `query` (case-insensitive), sorted by name. An empty query keeps
/// every group.
pub fn search<'a>(groups: &'a [Group], query: &str) -> Vec<&'a Group> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&Group> = groups
        .iter()
        .filter(|group| needle.is_empty() || group.name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches
}
