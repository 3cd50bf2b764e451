//! Show command handler
//!
//! Fetches the feed for the followed groups and prints it day by day.

use super::{CommandHandler, open_session};
use crate::cli::Commands;
use crate::config::Config;
use crate::schedule::ScheduleDay;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug)]
pub struct ShowHandler;

impl CommandHandler for ShowHandler {
    fn execute<'a>(
        &'a self,
        command: &'a Commands,
        config: &'a Config,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let json = matches!(command, Commands::Show { json: true });
            let mut session = open_session(config)?;

            if session.too_many_groups() {
                println!(
                    "Too many groups selected ({} of at most {})",
                    session.state().selected.len(),
                    config.groups.max_selected
                );
                return Ok(());
            }

            if session.state().selected.is_empty() {
                println!("No groups followed yet. Use 'kse-schedule groups toggle <id>'.");
            }

            if !session.refresh().await {
                println!("Schedule unavailable right now. Check your connection and try again.");
                return Ok(());
            }

            let days = session.state().days;
            if json {
                println!("{}", serde_json::to_string_pretty(&days)?);
            } else {
                print!("{}", render_days(&days));
            }
            Ok(())
        })
    }

    fn can_handle(&self, command: &Commands) -> bool {
        matches!(command, Commands::Show { .. })
    }
}

/// Plain-text rendering: a heading per day followed by its classes.
pub fn render_days(days: &[ScheduleDay]) -> String {
    if days.is_empty() {
        return "No classes in the coming days.\n".to_string();
    }

    let mut output = String::new();
    for day in days {
        output.push_str(&day.label);
        output.push('\n');
        for event in &day.events {
            output.push_str("  ");
            output.push_str(&event.display().replace('\n', "\n  "));
            output.push('\n');
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::IcsParser;
    use crate::schedule::group_by_day;
    use chrono::TimeZone;
    use chrono_tz::Europe::Kiev;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_days() {
        let content = "BEGIN:VEVENT\n\
                       SUMMARY:Statistics\n\
                       DTSTART;TZID=Europe/Kiev:20240604T140000\n\
                       DTEND;TZID=Europe/Kiev:20240604T152000\n\
                       LOCATION:Room 12\n\
                       END:VEVENT\n";
        let fallback = Kiev.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let days = group_by_day(IcsParser::with_fallback(Kiev, fallback).parse(content));

        assert_eq!(
            render_days(&days),
            "Tuesday, Jun 4\n  14:00 - 15:20  Statistics\n     Location: Room 12\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_days(&[]), "No classes in the coming days.\n");
    }

    #[test]
    fn test_can_handle() {
        assert!(ShowHandler.can_handle(&Commands::Show { json: false }));
    }
}
