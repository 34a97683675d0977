//! OMDb (Open Movie Database) client: short details plus IMDb, Rotten Tomatoes
//! and Metacritic ratings.

use artutils_core::{MediaType, Record};
use serde_json::Value;
use tracing::debug;

use crate::provider::RatingsProvider;
use crate::{ClientOptions, MetadataError, http};

const BASE_URL: &str = "https://www.omdbapi.com";

pub struct OmdbClient {
    options: ClientOptions,
    base_url: String,
    client: reqwest::Client,
}

impl OmdbClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            client: http::build_client(options.timeout),
            base_url: BASE_URL.to_string(),
            options,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> Result<Record, MetadataError> {
        let mut all_params = vec![
            ("apikey", self.options.api_key.as_str()),
            ("plot", "full"),
            ("r", "json"),
            ("tomatoes", "true"),
        ];
        all_params.extend_from_slice(params);

        let url = format!("{}/", self.base_url.trim_end_matches('/'));
        let data = http::send_json("omdb", self.client.get(&url).query(&all_params)).await?;

        // OMDb reports misses in-band with HTTP 200
        if data["Response"].as_str() == Some("False") {
            debug!(error = data["Error"].as_str().unwrap_or(""), "OMDb returned no result");
            return Ok(Record::new());
        }
        Ok(parse_omdb_record(&data))
    }
}

#[async_trait::async_trait]
impl RatingsProvider for OmdbClient {
    async fn by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        self.lookup(&[("i", imdb_id)]).await
    }

    async fn by_title(
        &self,
        title: &str,
        year: Option<i32>,
        media_type: MediaType,
    ) -> Result<Record, MetadataError> {
        let kind = if media_type.is_tv() { "series" } else { "movie" };
        let year = year.map(|y| y.to_string());
        let mut params = vec![("t", title), ("type", kind)];
        if let Some(year) = year.as_deref() {
            params.push(("y", year));
        }
        self.lookup(&params).await
    }
}

/// OMDb's placeholder for a missing field.
fn present(value: &Value) -> Option<&str> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "N/A")
}

fn split_list(value: &Value) -> Vec<String> {
    present(value)
        .map(|s| s.split(", ").map(str::to_string).collect())
        .unwrap_or_default()
}

/// `"148 min"` → seconds.
fn parse_runtime(value: &Value) -> Option<u64> {
    let minutes: u64 = present(value)?.split_whitespace().next()?.parse().ok()?;
    Some(minutes * 60)
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse().ok()
}

fn parse_omdb_record(data: &Value) -> Record {
    let mut record = Record::new();

    record.insert_opt("title", present(&data["Title"]));
    record.insert_opt("year", present(&data["Year"]));
    record.insert_opt("mpaa", present(&data["Rated"]));
    record.insert_opt("premiered", present(&data["Released"]));
    record.insert_opt("runtime", parse_runtime(&data["Runtime"]));
    record.insert_opt("genre", Some(split_list(&data["Genre"])));
    record.insert_opt("director", Some(split_list(&data["Director"])));
    record.insert_opt("writer", Some(split_list(&data["Writer"])));
    record.insert_opt("cast", Some(split_list(&data["Actors"])));
    record.insert_opt("plot", present(&data["Plot"]));
    record.insert_opt("awards", present(&data["Awards"]));
    record.insert_opt("country", present(&data["Country"]));
    record.insert_opt("studio", present(&data["Production"]));
    record.insert_opt("imdbnumber", present(&data["imdbID"]));

    let mut art = Record::new();
    art.insert_opt("poster", present(&data["Poster"]));
    record.insert_opt("art", Some(art.into_value()));

    record.insert_opt("rating.imdb", present(&data["imdbRating"]).and_then(parse_number));
    record.insert_opt(
        "votes.imdb",
        present(&data["imdbVotes"])
            .and_then(parse_number)
            .map(|v| v as u64),
    );
    record.insert_opt(
        "rating.metacritic",
        present(&data["Metascore"]).and_then(parse_number),
    );

    for rating in data["Ratings"].as_array().into_iter().flatten() {
        let Some(value) = present(&rating["Value"]) else {
            continue;
        };
        match rating["Source"].as_str() {
            Some("Rotten Tomatoes") => {
                record.insert_opt("rating.rt", parse_number(value.trim_end_matches('%')))
            }
            Some("Metacritic") if !record.contains("rating.metacritic") => {
                let score = value.split('/').next().and_then(parse_number);
                record.insert_opt("rating.metacritic", score)
            }
            _ => {}
        }
    }

    record.insert_opt(
        "rating.tomatometer",
        present(&data["tomatoMeter"]).and_then(parse_number),
    );
    record.insert_opt(
        "rating.tomatoaudience",
        present(&data["tomatoUserMeter"]).and_then(parse_number),
    );
    record.insert_opt("tomatoconsensus", present(&data["tomatoConsensus"]));
    record
}
