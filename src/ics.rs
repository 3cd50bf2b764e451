//! Line-oriented reader for the schedule feed.
//!
//! The feed is a flat iCalendar document: one property per line, no folded continuation lines,
//! and every class start/end carries the same `TZID`. Only the handful of properties shown in the
//! schedule are read; everything else is skipped.

use crate::event::Event;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const BEGIN_ALARM: &str = "BEGIN:VALARM";
const END_ALARM: &str = "END:VALARM";
const SUMMARY: &str = "SUMMARY:";
const LOCATION: &str = "LOCATION:";
const DESCRIPTION: &str = "DESCRIPTION:";

/// Local date-time layout used by `DTSTART`/`DTEND`, e.g. `20240605T090000`.
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Escaped blank line; everything after the first one is dropped from a description.
const ESCAPED_PARAGRAPH_BREAK: &str = "\\n\\n";
const ESCAPED_NEWLINE: &str = "\\n";

/// Where the reader is in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseState {
    Idle,
    InEvent(Event),
    /// Inside a `VALARM` nested in an event. The alarm's own description must not leak into the
    /// event.
    InAlarm(Event),
}

impl ParseState {
    fn current_event(&mut self) -> Option<&mut Event> {
        match self {
            ParseState::Idle => None,
            ParseState::InEvent(event) | ParseState::InAlarm(event) => Some(event),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IcsParser {
    tz: Tz,
    dtstart_prefix: String,
    dtend_prefix: String,
    fallback: DateTime<Tz>,
    state: ParseState,
}

impl IcsParser {
    /// Reader for a feed whose times are tagged `TZID=<tz>`.
    pub fn new(tz: Tz) -> Self {
        Self::with_fallback(tz, Utc::now().with_timezone(&tz))
    }

    /// Like [`IcsParser::new`], but malformed times resolve to `fallback` instead of the moment
    /// the parser was created.
    pub fn with_fallback(tz: Tz, fallback: DateTime<Tz>) -> Self {
        Self {
            tz,
            dtstart_prefix: format!("DTSTART;TZID={}:", tz.name()),
            dtend_prefix: format!("DTEND;TZID={}:", tz.name()),
            fallback,
            state: ParseState::Idle,
        }
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Reads a whole document and returns its events in document order.
    pub fn parse(mut self, content: &str) -> Vec<Event> {
        let mut events = Vec::new();
        for line in content.lines() {
            if let Some(event) = self.feed_line(line) {
                events.push(event);
            }
        }
        if !matches!(self.state, ParseState::Idle) {
            debug!("Feed ended inside an unterminated VEVENT; dropping it");
        }
        debug!("Parsed {} events", events.len());
        events
    }

    /// Advances the reader by one line. Returns the finished event when the line closes one.
    pub fn feed_line(&mut self, line: &str) -> Option<Event> {
        if line.starts_with(BEGIN_EVENT) {
            if !matches!(self.state, ParseState::Idle) {
                debug!("BEGIN:VEVENT inside an open event; discarding the unfinished one");
            }
            self.state = ParseState::InEvent(Event::empty(self.tz));
            return None;
        }

        if line.starts_with(END_EVENT) {
            return match std::mem::replace(&mut self.state, ParseState::Idle) {
                ParseState::Idle => {
                    debug!("END:VEVENT without an open event");
                    None
                }
                ParseState::InEvent(event) | ParseState::InAlarm(event) => Some(event),
            };
        }

        if line.starts_with(BEGIN_ALARM) {
            self.state = match std::mem::replace(&mut self.state, ParseState::Idle) {
                ParseState::InEvent(event) => ParseState::InAlarm(event),
                other => other,
            };
            return None;
        }

        if line.starts_with(END_ALARM) {
            self.state = match std::mem::replace(&mut self.state, ParseState::Idle) {
                ParseState::InAlarm(event) => ParseState::InEvent(event),
                other => other,
            };
            return None;
        }

        if let Some(value) = line.strip_prefix(DESCRIPTION) {
            if let ParseState::InEvent(event) = &mut self.state {
                event.description = clean_description(value);
            }
            return None;
        }

        let fallback = self.fallback;
        let tz = self.tz;
        if let Some(value) = line.strip_prefix(self.dtstart_prefix.as_str()) {
            let start = parse_local_time(value, tz).unwrap_or(fallback);
            if let Some(event) = self.state.current_event() {
                event.start = start;
            }
        } else if let Some(value) = line.strip_prefix(self.dtend_prefix.as_str()) {
            let end = parse_local_time(value, tz).unwrap_or(fallback);
            if let Some(event) = self.state.current_event() {
                event.end = end;
            }
        } else if let Some(value) = line.strip_prefix(SUMMARY) {
            if let Some(event) = self.state.current_event() {
                event.title = value.to_string();
            }
        } else if let Some(value) = line.strip_prefix(LOCATION) {
            if let Some(event) = self.state.current_event() {
                event.location = value.to_string();
            }
        }

        None
    }
}

/// Parses all events in `content`, tagging times with `tz`.
pub fn parse_events(content: &str, tz: Tz) -> Vec<Event> {
    IcsParser::new(tz).parse(content)
}

/// Keeps the first paragraph of an escaped description and flattens its line breaks.
pub fn clean_description(raw: &str) -> String {
    let first = raw.split(ESCAPED_PARAGRAPH_BREAK).next().unwrap_or_default();
    first.replace(ESCAPED_NEWLINE, " ")
}

/// Interprets `20240605T090000` as a wall-clock time in `tz`.
///
/// Returns `None` for malformed values and for wall-clock times skipped by a DST change.
/// A time repeated by a DST change resolves to its first occurrence.
pub fn parse_local_time(value: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = match NaiveDateTime::parse_from_str(value.trim(), DATE_TIME_FORMAT) {
        Ok(naive) => naive,
        Err(e) => {
            warn!("Malformed date-time '{}': {}", value, e);
            return None;
        }
    };
    let resolved = tz.from_local_datetime(&naive).earliest();
    if resolved.is_none() {
        warn!("Local time {} does not exist in {}", naive, tz.name());
    }
    resolved
}
