//! One consumer's view of the schedule and the fetch-and-parse cycle that refreshes it.

use crate::feed::{FeedClient, FeedFetcher};
use crate::ics::IcsParser;
use crate::schedule::{ScheduleDay, group_by_day};
use crate::selection::{GroupId, GroupSelection, KeyValueStore, SelectionStore};
use chrono::{Local, NaiveDate};
use chrono_tz::Tz;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::watch;

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleState {
    pub loading: bool,
    pub selected: GroupSelection,
    pub days: Vec<ScheduleDay>,
}

pub struct ScheduleSession<C, S> {
    fetcher: FeedFetcher<C>,
    selection: SelectionStore<S>,
    tz: Tz,
    max_selected: usize,
    state: watch::Sender<ScheduleState>,
}

impl<C: FeedClient, S: KeyValueStore> ScheduleSession<C, S> {
    pub fn new(fetcher: FeedFetcher<C>, selection: SelectionStore<S>, tz: Tz) -> Self {
        let initial = ScheduleState { selected: selection.load(), ..ScheduleState::default() };
        let (state, _) = watch::channel(initial);
        Self { fetcher, selection, tz, max_selected: usize::MAX, state }
    }

    /// Caps how many groups may be followed before [`Self::too_many_groups`] trips.
    pub fn with_max_selected(mut self, max_selected: usize) -> Self {
        self.max_selected = max_selected;
        self
    }

    pub fn state(&self) -> ScheduleState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change, including the loading flag mid-refresh.
    pub fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.state.subscribe()
    }

    pub fn too_many_groups(&self) -> bool {
        self.state.borrow().selected.len() > self.max_selected
    }

    pub fn toggle_group(&self, id: GroupId) -> GroupSelection {
        let selected = self.selection.toggle(id);
        self.state.send_modify(|state| state.selected = selected.clone());
        selected
    }

    /// Refreshes using today's local date as the start of the feed window.
    pub async fn refresh(&mut self) -> bool {
        self.refresh_on(Local::now().date_naive()).await
    }

    /// Reloads the selection, downloads the feed and replaces the days on success.
    ///
    /// Returns whether new content arrived. When the download fails the previous days stay. The
    /// loading flag is cleared even if this future is dropped before completing, and the days are
    /// only written after the download finished.
    pub async fn refresh_on(&mut self, today: NaiveDate) -> bool {
        let ids: Vec<GroupId> = {
            let selected = self.selection.load();
            let ids = selected.iter().copied().collect();
            self.state.send_modify(|state| {
                state.selected = selected;
                state.loading = true;
            });
            ids
        };

        let content = {
            let _loading = scopeguard::guard(&self.state, |state| {
                state.send_modify(|state| state.loading = false);
            });
            self.fetcher.download(&ids, today).await
        };

        let Some(content) = content else {
            warn!("No schedule received; keeping the previous one");
            return false;
        };

        let events = IcsParser::new(self.tz).parse(&content);
        let days = group_by_day(events);
        info!("Schedule refreshed: {} days", days.len());
        debug!("Days: {:?}", days.iter().map(|d| d.label.as_str()).collect::<Vec<_>>());
        self.state.send_modify(|state| state.days = days);
        true
    }
}
