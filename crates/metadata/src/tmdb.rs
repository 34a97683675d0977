//! TMDB (The Movie Database) provider client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use artutils_core::{ExternalSource, MediaType, Record, Selector};
use serde_json::{Value, json};
use tracing::debug;

use crate::provider::{SearchResult, VideoDetailsProvider};
use crate::{ClientOptions, MetadataError, http, matching};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

pub struct TmdbClient {
    options: ClientOptions,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
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

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, MetadataError> {
        let mut all_params = vec![
            ("api_key", self.options.api_key.as_str()),
            ("language", self.options.language.as_str()),
        ];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TMDB request");

        http::send_json("tmdb", self.client.get(&url).query(&all_params)).await
    }

    async fn search(
        &self,
        kind: MediaType,
        title: &str,
        year: Option<i32>,
    ) -> Result<Vec<SearchResult>, MetadataError> {
        let (path, year_param) = match kind {
            MediaType::Movie => ("/search/movie", Some("year")),
            MediaType::TvShow => ("/search/tv", Some("first_air_date_year")),
            _ => ("/search/multi", None),
        };

        let mut params = vec![("query", title)];
        let year_str = year.map(|y| y.to_string());
        if let (Some(param), Some(y)) = (year_param, year_str.as_deref()) {
            params.push((param, y));
        }

        let data = self.get_json(path, &params).await?;
        Ok(parse_search_results(&data, kind))
    }

    async fn movie_details(&self, tmdb_id: &str) -> Result<Record, MetadataError> {
        let data = self
            .get_json(
                &format!("/movie/{tmdb_id}"),
                &[("append_to_response", "credits,videos")],
            )
            .await?;
        Ok(parse_movie_record(&data))
    }

    async fn tv_details(&self, tmdb_id: &str) -> Result<Record, MetadataError> {
        let data = self
            .get_json(
                &format!("/tv/{tmdb_id}"),
                &[("append_to_response", "credits,external_ids")],
            )
            .await?;
        Ok(parse_series_record(&data))
    }

    async fn details(&self, hit: &SearchResult) -> Result<Record, MetadataError> {
        match hit.media_type {
            MediaType::TvShow => self.tv_details(&hit.provider_id).await,
            _ => self.movie_details(&hit.provider_id).await,
        }
    }

    async fn search_and_fetch(
        &self,
        kind: MediaType,
        title: &str,
        year: Option<i32>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        let results = self.search(kind, title, year).await?;
        match matching::choose(title, year, &results, selector) {
            Some(hit) => self.details(hit).await,
            None => Ok(Record::new()),
        }
    }
}

#[async_trait::async_trait]
impl VideoDetailsProvider for TmdbClient {
    async fn details_by_external_id(
        &self,
        external_id: &str,
        source: ExternalSource,
    ) -> Result<Record, MetadataError> {
        let data = self
            .get_json(
                &format!("/find/{external_id}"),
                &[("external_source", source.as_str())],
            )
            .await?;

        let first_id = |key: &str| {
            data[key]
                .as_array()
                .and_then(|a| a.first())
                .and_then(|r| r["id"].as_u64())
                .map(|id| id.to_string())
        };
        let (movie, tv) = (first_id("movie_results"), first_id("tv_results"));

        // a TheTVDB id only ever names a show; an IMDb id usually names a movie
        let pick = match source {
            ExternalSource::Tvdb => tv.map(|id| (MediaType::TvShow, id)),
            ExternalSource::Imdb => movie
                .map(|id| (MediaType::Movie, id))
                .or_else(|| tv.map(|id| (MediaType::TvShow, id))),
        };

        match pick {
            Some((MediaType::TvShow, id)) => self.tv_details(&id).await,
            Some((_, id)) => self.movie_details(&id).await,
            None => Ok(Record::new()),
        }
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<i32>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        self.search_and_fetch(MediaType::Movie, title, year, selector)
            .await
    }

    async fn search_tvshow(
        &self,
        title: &str,
        year: Option<i32>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        self.search_and_fetch(MediaType::TvShow, title, year, selector)
            .await
    }

    async fn search_video(
        &self,
        title: &str,
        year: Option<i32>,
        preftype: Option<MediaType>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        let results = self.search(MediaType::Other, title, year).await?;
        let preferred: Vec<SearchResult> = match preftype {
            Some(kind) => results
                .iter()
                .filter(|r| r.media_type == kind)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        let pool = if preferred.is_empty() { &results } else { &preferred };

        match matching::choose(title, year, pool, selector) {
            Some(hit) => self.details(hit).await,
            None => Ok(Record::new()),
        }
    }
}

fn parse_search_results(data: &Value, kind: MediaType) -> Vec<SearchResult> {
    let results = data["results"].as_array().cloned().unwrap_or_default();

    results
        .iter()
        .filter_map(|r| {
            let media_type = match kind {
                MediaType::Movie | MediaType::TvShow => kind,
                _ => match r["media_type"].as_str() {
                    Some("movie") => MediaType::Movie,
                    Some("tv") => MediaType::TvShow,
                    _ => return None,
                },
            };
            let (title_key, date_key) = match media_type {
                MediaType::TvShow => ("name", "first_air_date"),
                _ => ("title", "release_date"),
            };
            Some(SearchResult {
                provider_id: r["id"].as_u64()?.to_string(),
                title: r[title_key].as_str().unwrap_or("Unknown").to_string(),
                year: year_of(&r[date_key]),
                media_type,
                overview: r["overview"].as_str().map(|s| s.to_string()),
                poster_url: r["poster_path"]
                    .as_str()
                    .map(|p| format!("{IMAGE_BASE}/w500{p}")),
            })
        })
        .take(10)
        .collect()
}

fn year_of(date: &Value) -> Option<i32> {
    date.as_str()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok())
}

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn image(path: &Value) -> Option<String> {
    path.as_str().map(|p| format!("{IMAGE_BASE}/original{p}"))
}

fn parse_movie_record(data: &Value) -> Record {
    let mut rec = common_fields(data);
    rec.insert("media_type", "movie");
    rec.insert_opt("title", data["title"].as_str());
    rec.insert_opt("originaltitle", data["original_title"].as_str());
    rec.insert_opt("premiered", data["release_date"].as_str());
    rec.insert_opt("year", year_of(&data["release_date"]));
    rec.insert_opt("tagline", data["tagline"].as_str());
    rec.insert_opt("imdbnumber", data["imdb_id"].as_str());
    rec.insert_opt("country", Some(names(&data["production_countries"])));
    rec.insert_opt("runtime", data["runtime"].as_u64().map(|m| m * 60));
    rec.insert_opt("budget", data["budget"].as_u64().filter(|b| *b > 0));
    rec.insert_opt("revenue", data["revenue"].as_u64().filter(|r| *r > 0));
    rec.insert_opt("set", data["belongs_to_collection"]["name"].as_str());
    rec.insert_opt("trailer", youtube_trailer(&data["videos"]));
    rec
}

fn parse_series_record(data: &Value) -> Record {
    let mut rec = common_fields(data);
    rec.insert("media_type", "tvshow");
    rec.insert_opt("title", data["name"].as_str());
    rec.insert_opt("originaltitle", data["original_name"].as_str());
    rec.insert_opt("premiered", data["first_air_date"].as_str());
    rec.insert_opt("year", year_of(&data["first_air_date"]));
    rec.insert_opt("lastaired", data["last_air_date"].as_str());
    rec.insert_opt("network", Some(names(&data["networks"])));
    rec.insert_opt("seasons", data["number_of_seasons"].as_u64());
    rec.insert_opt("episodes", data["number_of_episodes"].as_u64());
    rec.insert_opt(
        "runtime",
        data["episode_run_time"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_u64())
            .map(|m| m * 60),
    );
    rec.insert_opt("imdbnumber", data["external_ids"]["imdb_id"].as_str());
    rec.insert_opt(
        "tvdb_id",
        data["external_ids"]["tvdb_id"].as_u64().map(|id| id.to_string()),
    );
    rec
}

fn common_fields(data: &Value) -> Record {
    let mut rec = Record::new();
    rec.insert_opt("tmdb_id", data["id"].as_u64().map(|id| id.to_string()));
    rec.insert_opt("plot", data["overview"].as_str());
    rec.insert_opt("status", data["status"].as_str());
    rec.insert_opt("rating", data["vote_average"].as_f64());
    rec.insert_opt("votes", data["vote_count"].as_u64());
    rec.insert_opt("homepage", data["homepage"].as_str());
    rec.insert_opt("genre", Some(names(&data["genres"])));
    rec.insert_opt("studio", Some(names(&data["production_companies"])));

    let credits = &data["credits"];
    rec.insert_opt("cast", Some(extract_cast(credits)));
    rec.insert_opt("director", Some(crew_with_job(credits, &["Director"])));
    rec.insert_opt(
        "writer",
        Some(crew_with_job(credits, &["Writer", "Screenplay", "Author"])),
    );

    let mut art = Record::new();
    art.insert_opt("poster", image(&data["poster_path"]));
    art.insert_opt("fanart", image(&data["backdrop_path"]));
    rec.insert_opt("art", Some(art));
    rec
}

fn extract_cast(credits: &Value) -> Vec<Value> {
    credits["cast"]
        .as_array()
        .map(|cast| {
            cast.iter()
                .take(20)
                .map(|person| {
                    json!({
                        "name": person["name"].as_str().unwrap_or(""),
                        "role": person["character"].as_str().unwrap_or(""),
                        "thumbnail": person["profile_path"]
                            .as_str()
                            .map(|p| format!("{IMAGE_BASE}/w185{p}"))
                            .unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn crew_with_job(credits: &Value, jobs: &[&str]) -> Vec<String> {
    let mut people: Vec<String> = Vec::new();
    for person in credits["crew"].as_array().into_iter().flatten() {
        let is_match = person["job"].as_str().is_some_and(|j| jobs.contains(&j));
        if let (true, Some(name)) = (is_match, person["name"].as_str()) {
            if !people.iter().any(|p| p == name) {
                people.push(name.to_string());
            }
        }
    }
    people
}

fn youtube_trailer(videos: &Value) -> Option<String> {
    videos["results"].as_array()?.iter().find_map(|v| {
        (v["site"].as_str() == Some("YouTube") && v["type"].as_str() == Some("Trailer"))
            .then(|| v["key"].as_str())
            .flatten()
            .map(|key| format!("plugin://plugin.video.youtube/play/?video_id={key}"))
    })
}
