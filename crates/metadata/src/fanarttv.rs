//! fanart.tv artwork client (API v3).
//!
//! Every artwork kind comes back as a list of `{url, lang, likes}`; we keep the
//! best image per kind plus the full list of backgrounds.

use artutils_core::Record;
use serde_json::Value;

use crate::provider::FanartProvider;
use crate::{ClientOptions, MetadataError, http};

const BASE_URL: &str = "https://webservice.fanart.tv/v3";

/// (output key, source keys in priority order)
const MOVIE_ART: &[(&str, &[&str])] = &[
    ("clearlogo", &["hdmovielogo", "movielogo"]),
    ("clearart", &["hdmovieclearart", "movieart"]),
    ("discart", &["moviedisc"]),
    ("banner", &["moviebanner"]),
    ("landscape", &["moviethumb"]),
    ("poster", &["movieposter"]),
    ("fanart", &["moviebackground"]),
];

const TV_ART: &[(&str, &[&str])] = &[
    ("clearlogo", &["hdtvlogo", "clearlogo"]),
    ("clearart", &["hdclearart", "clearart"]),
    ("characterart", &["characterart"]),
    ("banner", &["tvbanner"]),
    ("landscape", &["tvthumb"]),
    ("poster", &["tvposter"]),
    ("fanart", &["showbackground"]),
];

const ARTIST_ART: &[(&str, &[&str])] = &[
    ("clearlogo", &["hdmusiclogo", "musiclogo"]),
    ("banner", &["musicbanner"]),
    ("thumb", &["artistthumb"]),
    ("fanart", &["artistbackground"]),
];

const ALBUM_ART: &[(&str, &[&str])] = &[("thumb", &["albumcover"]), ("discart", &["cdart"])];

pub struct FanartTvClient {
    options: ClientOptions,
    base_url: String,
    client: reqwest::Client,
}

impl FanartTvClient {
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

    async fn get_json(&self, path: &str) -> Result<Value, MetadataError> {
        let url = format!("{}{path}", self.base_url);
        http::send_json(
            "fanart.tv",
            self.client
                .get(&url)
                .query(&[("api_key", self.options.api_key.as_str())]),
        )
        .await
    }

    async fn artwork(
        &self,
        path: &str,
        mapping: &[(&str, &[&str])],
        backgrounds: &[&str],
    ) -> Result<Record, MetadataError> {
        let data = match self.get_json(path).await {
            Err(MetadataError::NotFound) => return Ok(Record::new()),
            other => other?,
        };
        Ok(parse_artwork(&data, mapping, backgrounds, &self.options.language))
    }
}

#[async_trait::async_trait]
impl FanartProvider for FanartTvClient {
    async fn movie(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        self.artwork(&format!("/movies/{imdb_id}"), MOVIE_ART, &["moviebackground"])
            .await
    }

    async fn tvshow(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        self.artwork(&format!("/tv/{tvdb_id}"), TV_ART, &["showbackground"])
            .await
    }

    async fn music_artist(&self, artist_mbid: &str) -> Result<Record, MetadataError> {
        self.artwork(&format!("/music/{artist_mbid}"), ARTIST_ART, &["artistbackground"])
            .await
    }

    async fn music_album(&self, album_mbid: &str) -> Result<Record, MetadataError> {
        let data = match self.get_json(&format!("/music/albums/{album_mbid}")).await {
            Err(MetadataError::NotFound) => return Ok(Record::new()),
            other => other?,
        };
        // albums are keyed by release-group id under "albums"
        let album = data["albums"]
            .get(album_mbid)
            .or_else(|| data["albums"].as_object().and_then(|a| a.values().next()))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(parse_artwork(&album, ALBUM_ART, &[], &self.options.language))
    }
}

fn parse_artwork(
    data: &Value,
    mapping: &[(&str, &[&str])],
    backgrounds: &[&str],
    language: &str,
) -> Record {
    let mut art = Record::new();
    for (key, sources) in mapping {
        let best = sources
            .iter()
            .find_map(|source| best_image(&data[*source], language));
        art.insert_opt(*key, best);
    }

    let fanarts: Vec<String> = backgrounds
        .iter()
        .flat_map(|source| data[*source].as_array().cloned().unwrap_or_default())
        .filter_map(|img| img["url"].as_str().map(str::to_string))
        .collect();
    art.insert_opt("fanarts", Some(fanarts));
    art
}

/// Preferred language first, then English, then language-neutral, then any;
/// most liked within each tier.
fn best_image(images: &Value, language: &str) -> Option<String> {
    let images = images.as_array()?;
    let tier = |img: &Value| match img["lang"].as_str().unwrap_or("") {
        l if l == language => 0,
        "en" => 1,
        "" | "00" => 2,
        _ => 3,
    };
    let likes = |img: &Value| {
        img["likes"]
            .as_str()
            .and_then(|l| l.parse::<i64>().ok())
            .or_else(|| img["likes"].as_i64())
            .unwrap_or(0)
    };

    images
        .iter()
        .filter(|img| img["url"].as_str().is_some())
        .min_by_key(|img| (tier(*img), -likes(*img)))
        .and_then(|img| img["url"].as_str())
        .map(str::to_string)
}
