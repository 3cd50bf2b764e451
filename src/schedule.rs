//! Groups parsed events into calendar days.

use crate::event::Event;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Heading format for a day, e.g. `Thursday, Jun 5`.
pub const DAY_LABEL_FORMAT: &str = "%A, %b %-d";
/// Used instead of [`DAY_LABEL_FORMAT`] when two days in one schedule would share a label.
pub const DAY_LABEL_WITH_YEAR_FORMAT: &str = "%A, %b %-d, %Y";

/// One day of the schedule, events kept in feed order. Labels are unique within one
/// [`group_by_day`] result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDay {
    pub label: String,
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

pub fn day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}

/// Recovers the date behind a label. Labels carry no year, so the caller supplies it; a label
/// whose weekday disagrees with the date in that year is rejected.
pub fn parse_day_label(label: &str, year: i32) -> Option<NaiveDate> {
    let (weekday, rest) = label.split_once(", ")?;
    let date = NaiveDate::parse_from_str(&format!("{} {}", rest, year), "%b %d %Y").ok()?;
    let expected = date.format("%A").to_string();
    (expected == weekday).then_some(date)
}

/// Buckets events by the calendar day of their start, in the feed zone, and returns the days in
/// ascending order.
pub fn group_by_day(events: Vec<Event>) -> Vec<ScheduleDay> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        buckets.entry(event.start.date_naive()).or_default().push(event);
    }

    let mut days: Vec<ScheduleDay> = buckets
        .into_iter()
        .map(|(date, events)| ScheduleDay { label: day_label(date), date, events })
        .collect();

    // Same weekday and day of month in different years
    let mut label_counts: HashMap<String, usize> = HashMap::new();
    for day in &days {
        *label_counts.entry(day.label.clone()).or_default() += 1;
    }
    for day in &mut days {
        if label_counts.get(&day.label).is_some_and(|count| *count > 1) {
            day.label = day.date.format(DAY_LABEL_WITH_YEAR_FORMAT).to_string();
        }
    }
    days
}
