//! TheTVDB v4 client.
//!
//! Requests carry a bearer token obtained from `POST /login`; the token is kept
//! for the lifetime of the client and refreshed once when the API rejects it.

use artutils_core::Record;
use chrono::{Duration, Local, NaiveDate};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::provider::SeriesProvider;
use crate::{ClientOptions, MetadataError, http};

const BASE_URL: &str = "https://api4.thetvdb.com/v4";

/// Episode listings are paged; stop following `links.next` after this many.
const MAX_EPISODE_PAGES: u32 = 20;

pub struct TvdbClient {
    options: ClientOptions,
    base_url: String,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl TvdbClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            client: http::build_client(options.timeout),
            base_url: BASE_URL.to_string(),
            token: Mutex::new(None),
            options,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn token(&self) -> Result<String, MetadataError> {
        let mut token = self.token.lock().await;
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{}/login", self.base_url);
        let resp = http::send_json(
            "tvdb",
            self.client
                .post(&url)
                .json(&json!({ "apikey": self.options.api_key })),
        )
        .await?;
        let fresh = resp["data"]["token"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MetadataError::Auth("tvdb login response missing token".into()))?
            .to_string();
        info!("TheTVDB login successful");
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, MetadataError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TheTVDB request");

        let mut retried = false;
        loop {
            let token = self.token().await?;
            let request = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .header("Accept-Language", self.options.language.as_str())
                .query(params);
            match http::send_json("tvdb", request).await {
                Err(MetadataError::Auth(_)) if !retried => {
                    // expired token: log in again once
                    *self.token.lock().await = None;
                    retried = true;
                }
                other => return other,
            }
        }
    }

    /// Every episode of the default season order, following pagination.
    async fn episodes(&self, tvdb_id: &str) -> Result<Vec<Value>, MetadataError> {
        let path = format!("/series/{tvdb_id}/episodes/default");
        let mut episodes = Vec::new();
        for page in 0..MAX_EPISODE_PAGES {
            let page = page.to_string();
            let data = self.get_json(&path, &[("page", page.as_str())]).await?;
            if let Some(batch) = data["data"]["episodes"].as_array() {
                episodes.extend(batch.iter().cloned());
            }
            if data["links"]["next"].is_null() {
                break;
            }
        }
        Ok(episodes)
    }
}

#[async_trait::async_trait]
impl SeriesProvider for TvdbClient {
    async fn series(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        let data = match self
            .get_json(&format!("/series/{tvdb_id}/extended"), &[("short", "true")])
            .await
        {
            Err(MetadataError::NotFound) => return Ok(Record::new()),
            other => other?,
        };
        Ok(parse_series_record(&data["data"]))
    }

    async fn series_by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        let data = match self.get_json(&format!("/search/remoteid/{imdb_id}"), &[]).await {
            Err(MetadataError::NotFound) => return Ok(Record::new()),
            other => other?,
        };
        let Some(tvdb_id) = data["data"]
            .as_array()
            .into_iter()
            .flatten()
            .find_map(|hit| hit["series"]["id"].as_i64())
        else {
            return Ok(Record::new());
        };
        self.series(&tvdb_id.to_string()).await
    }

    async fn next_aired_episode(
        &self,
        tvdb_id: &str,
        days_ahead: u32,
    ) -> Result<Record, MetadataError> {
        let episodes = self.episodes(tvdb_id).await?;
        let today = Local::now().date_naive();
        Ok(next_aired(&episodes, today, days_ahead)
            .map(parse_episode_record)
            .unwrap_or_default())
    }

    async fn last_episode(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        let episodes = self.episodes(tvdb_id).await?;
        let today = Local::now().date_naive();
        Ok(last_aired(&episodes, today)
            .map(parse_episode_record)
            .unwrap_or_default())
    }
}

fn aired_date(episode: &Value) -> Option<NaiveDate> {
    let aired = episode["aired"].as_str()?;
    NaiveDate::parse_from_str(aired, "%Y-%m-%d").ok()
}

/// Specials (season 0) never count as the next or last episode.
fn regular_episodes(episodes: &[Value]) -> impl Iterator<Item = (NaiveDate, &Value)> {
    episodes
        .iter()
        .filter(|ep| ep["seasonNumber"].as_i64().unwrap_or(0) > 0)
        .filter_map(|ep| aired_date(ep).map(|date| (date, ep)))
}

/// Earliest episode airing in `[today, today + days_ahead]`.
fn next_aired(episodes: &[Value], today: NaiveDate, days_ahead: u32) -> Option<&Value> {
    let horizon = today + Duration::days(i64::from(days_ahead));
    regular_episodes(episodes)
        .filter(|(date, _)| *date >= today && *date <= horizon)
        .min_by_key(|(date, ep)| (*date, episode_order(ep)))
        .map(|(_, ep)| ep)
}

/// Latest episode that aired before today.
fn last_aired(episodes: &[Value], today: NaiveDate) -> Option<&Value> {
    regular_episodes(episodes)
        .filter(|(date, _)| *date < today)
        .max_by_key(|(date, ep)| (*date, episode_order(ep)))
        .map(|(_, ep)| ep)
}

fn episode_order(episode: &Value) -> (i64, i64) {
    (
        episode["seasonNumber"].as_i64().unwrap_or(0),
        episode["number"].as_i64().unwrap_or(0),
    )
}

fn parse_series_record(data: &Value) -> Record {
    let mut record = Record::new();

    record.insert_opt("tvdb_id", data["id"].as_i64().map(|id| id.to_string()));
    record.insert_opt("title", data["name"].as_str());
    record.insert_opt("plot", data["overview"].as_str());
    record.insert_opt("status", data["status"]["name"].as_str());
    record.insert_opt("premiered", data["firstAired"].as_str());
    record.insert_opt("lastaired", data["lastAired"].as_str());
    record.insert_opt("year", data["year"].as_str().and_then(|y| y.parse::<i32>().ok()));
    record.insert_opt(
        "runtime",
        data["averageRuntime"].as_u64().filter(|m| *m > 0).map(|m| m * 60),
    );
    record.insert_opt(
        "network",
        data["originalNetwork"]["name"]
            .as_str()
            .or_else(|| data["latestNetwork"]["name"].as_str()),
    );

    let genres: Vec<&str> = data["genres"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|g| g["name"].as_str())
        .collect();
    record.insert_opt("genre", Some(genres));

    let imdb = data["remoteIds"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|r| r["sourceName"].as_str() == Some("IMDB"))
        .and_then(|r| r["id"].as_str());
    record.insert_opt("imdbnumber", imdb);

    let mut art = Record::new();
    art.insert_opt("poster", data["image"].as_str());
    record.insert_opt("art", Some(art.into_value()));
    record
}

fn parse_episode_record(episode: &Value) -> Record {
    let mut record = Record::new();
    let (season, number) = episode_order(episode);

    record.insert_opt("tvdb_id", episode["id"].as_i64().map(|id| id.to_string()));
    record.insert_opt("title", episode["name"].as_str());
    record.insert_opt("plot", episode["overview"].as_str());
    record.insert_opt("firstaired", episode["aired"].as_str());
    record.insert("season", season);
    record.insert("episode", number);
    record.insert("label", format!("{season}x{number:02}"));
    record.insert_opt("thumb", episode["image"].as_str());
    record.insert_opt(
        "runtime",
        episode["runtime"].as_u64().filter(|m| *m > 0).map(|m| m * 60),
    );
    record
}
