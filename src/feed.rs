//! Download of the schedule feed.
//!
//! The HTTP side sits behind [`FeedClient`] so the fetch-and-parse cycle can be driven without a
//! network. [`FeedFetcher`] owns the URL rules and turns every failure into "no content".

use crate::selection::GroupId;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use log::{debug, error, info};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://schedule.kse.ua/uk/index/ical";
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Layout of the `date_end` query parameter.
const END_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Feed responded with HTTP {0}")]
    Status(u16),
}

/// Source of raw feed text.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String, FeedError>;
}

/// [`FeedClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn get_text(&self, url: &Url) -> Result<String, FeedError> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Last day requested from the feed, formatted for the `date_end` parameter.
pub fn end_date(today: NaiveDate, window_days: u64) -> String {
    let end = today.checked_add_days(Days::new(window_days)).unwrap_or(NaiveDate::MAX);
    end.format(END_DATE_FORMAT).to_string()
}

/// Feed URL for `ids`, covering `window_days` from `today`.
///
/// An empty selection still yields a URL with an empty `id_grp`.
pub fn feed_url(
    base: &str,
    ids: &[GroupId],
    today: NaiveDate,
    window_days: u64,
) -> Result<Url, FeedError> {
    let mut url = Url::parse(base)?;
    let id_list = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    url.set_query(Some(&format!(
        "id_grp={}&date_end={}",
        id_list,
        end_date(today, window_days)
    )));
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct FeedFetcher<C> {
    client: C,
    base_url: String,
    window_days: u64,
}

impl<C: FeedClient> FeedFetcher<C> {
    pub fn new(client: C, base_url: impl Into<String>, window_days: u64) -> Self {
        Self { client, base_url: base_url.into(), window_days }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetches the feed text. Any failure is logged and reported as `None`.
    pub async fn download(&self, ids: &[GroupId], today: NaiveDate) -> Option<String> {
        match self.try_download(ids, today).await {
            Ok(content) => {
                debug!("Received {} bytes of feed content", content.len());
                Some(content)
            }
            Err(e) => {
                error!("Download error: {}", e);
                None
            }
        }
    }

    async fn try_download(&self, ids: &[GroupId], today: NaiveDate) -> Result<String, FeedError> {
        let url = feed_url(&self.base_url, ids, today, self.window_days)?;
        info!("Fetching schedule for groups {:?}", ids);
        self.client.get_text(&url).await
    }
}
