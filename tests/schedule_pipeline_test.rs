use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Kiev;
use kse_schedule::catalog::{Group, parse_catalog};
use kse_schedule::selection::{FileStore, MemoryStore};
use kse_schedule::{
    FeedClient, FeedError, FeedFetcher, GroupSelection, IcsParser, ScheduleSession,
    SelectionStore, group_by_day,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

const TWO_DAY_FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//KSE//Schedule//UK\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Game Theory\r\n\
DTSTART;TZID=Europe/Kiev:20240605T090000\r\n\
DTEND;TZID=Europe/Kiev:20240605T102000\r\n\
LOCATION:Room 301\r\n\
DESCRIPTION:Lecture notes\\n\\nReminder: bring laptop\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Alarm text\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Econometrics\r\n\
DTSTART;TZID=Europe/Kiev:20240604T140000\r\n\
DTEND;TZID=Europe/Kiev:20240604T152000\r\n\
LOCATION:Room 12\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn parser() -> IcsParser {
    IcsParser::with_fallback(Kiev, Kiev.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

#[test]
fn test_days_come_out_in_chronological_order() {
    let days = group_by_day(parser().parse(TWO_DAY_FEED));

    let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Tuesday, Jun 4", "Wednesday, Jun 5"]);
    assert_eq!(days[0].events[0].title, "Econometrics");
    assert_eq!(days[1].events[0].title, "Game Theory");
}

#[test]
fn test_description_keeps_first_paragraph_and_ignores_alarm() {
    let days = group_by_day(parser().parse(TWO_DAY_FEED));
    assert_eq!(days[1].events[0].description, "Lecture notes");
    assert_eq!(days[1].events[0].location, "Room 301");
}

#[test]
fn test_catalog_example() {
    assert_eq!(
        parse_catalog("12 : Group A\nbad line\n"),
        vec![Group { id: 12, name: "Group A".to_string() }]
    );
}

struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, FeedError>>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, FeedError>>) -> Self {
        Self { responses: Mutex::new(responses.into()) }
    }
}

#[async_trait]
impl FeedClient for ScriptedClient {
    async fn get_text(&self, _url: &Url) -> Result<String, FeedError> {
        self.responses.lock().unwrap().pop_front().unwrap_or(Err(FeedError::Status(500)))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn test_failed_fetch_leaves_schedule_and_clears_loading() {
    let client = ScriptedClient::new(vec![
        Ok(TWO_DAY_FEED.to_string()),
        Err(FeedError::Status(503)),
    ]);
    let fetcher = FeedFetcher::new(client, "https://schedule.kse.ua/uk/index/ical", 30);
    let mut session =
        ScheduleSession::new(fetcher, SelectionStore::new(MemoryStore::default()), Kiev);

    assert!(session.refresh_on(today()).await);
    let before = session.state();
    assert_eq!(before.days.len(), 2);

    assert!(!session.refresh_on(today()).await);
    let after = session.state();
    assert!(!after.loading);
    assert_eq!(after.days, before.days);
}

#[tokio::test]
async fn test_selection_persists_across_sessions() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;

    let store = SelectionStore::new(FileStore::in_dir(temp_dir.path()));
    store.toggle(12);
    store.toggle(7);
    store.toggle(30);
    store.toggle(30);
    assert_eq!(store.load(), GroupSelection::from([7, 12]));

    let client = ScriptedClient::new(vec![Ok(String::new())]);
    let fetcher = FeedFetcher::new(client, "https://schedule.kse.ua/uk/index/ical", 30);
    let reopened = SelectionStore::new(FileStore::in_dir(temp_dir.path()));
    let mut session = ScheduleSession::new(fetcher, reopened, Kiev);

    assert!(session.refresh_on(today()).await);
    assert!(session.state().days.is_empty());
    assert_eq!(session.state().selected, GroupSelection::from([7, 12]));
    Ok(())
}
