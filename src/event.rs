use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// A single class from the schedule feed.
///
/// Start and end are instants in the feed's fixed zone. An event whose block never set
/// `DTSTART`/`DTEND` keeps the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: String,
    pub description: String,
}

impl Event {
    /// Creates an empty event anchored in `tz`.
    pub fn empty(tz: Tz) -> Self {
        let epoch = DateTime::<Utc>::default().with_timezone(&tz);
        Self {
            title: String::new(),
            start: epoch,
            end: epoch,
            location: String::new(),
            description: String::new(),
        }
    }

    /// `"HH:MM - HH:MM"` in the feed zone.
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    pub fn display(&self) -> String {
        let mut output = format!("{}  {}", self.time_range(), self.title);

        if !self.location.is_empty() {
            output.push_str(&format!("\n   Location: {}", self.location));
        }

        if !self.description.is_empty() {
            output.push_str(&format!("\n   {}", self.description));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Kiev;

    #[test]
    fn test_empty_event_defaults() {
        let event = Event::empty(Kiev);
        assert!(event.title.is_empty());
        assert!(event.location.is_empty());
        assert!(event.description.is_empty());
        assert_eq!(event.start.timestamp(), 0);
        assert_eq!(event.end.timestamp(), 0);
    }

    #[test]
    fn test_time_range_and_display() {
        let mut event = Event::empty(Kiev);
        event.title = "Microeconomics".to_string();
        event.start = Kiev.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        event.end = Kiev.with_ymd_and_hms(2024, 6, 5, 10, 20, 0).unwrap();
        event.location = "Room 204".to_string();

        assert_eq!(event.time_range(), "09:00 - 10:20");
        assert_eq!(event.display(), "09:00 - 10:20  Microeconomics\n   Location: Room 204");
    }
}
