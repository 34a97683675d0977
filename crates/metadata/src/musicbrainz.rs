//! MusicBrainz id resolution for fanart.tv music lookups.

use serde::Deserialize;
use tracing::debug;

use crate::matching::normalize_title_for_match;
use crate::provider::MusicBrainzProvider;
use crate::{MetadataError, http};

const BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// Search hits below this score are treated as no match.
const MIN_SCORE: u32 = 80;

#[derive(Debug, Deserialize)]
struct ArtistSearch {
    #[serde(default)]
    artists: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct ReleaseGroupSearch {
    #[serde(default, rename = "release-groups")]
    release_groups: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    id: String,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    score: u32,
}

pub struct MusicBrainzClient {
    base_url: String,
    client: reqwest::Client,
}

impl MusicBrainzClient {
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            client: http::build_client(timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn search(&self, entity: &str, query: &str) -> Result<serde_json::Value, MetadataError> {
        let url = format!("{}/{entity}", self.base_url);
        debug!(entity, query, "MusicBrainz search");
        http::send_json(
            "musicbrainz",
            self.client
                .get(&url)
                .query(&[("query", query), ("fmt", "json"), ("limit", "10")]),
        )
        .await
    }
}

#[async_trait::async_trait]
impl MusicBrainzProvider for MusicBrainzClient {
    async fn artist_id(&self, artist: &str) -> Result<Option<String>, MetadataError> {
        let data = self
            .search("artist", &format!("artist:\"{}\"", escape(artist)))
            .await?;
        let search: ArtistSearch = serde_json::from_value(data)
            .map_err(|e| MetadataError::Provider(format!("musicbrainz: {e}")))?;
        Ok(best_hit(artist, &search.artists))
    }

    async fn album_id(&self, artist: &str, album: &str) -> Result<Option<String>, MetadataError> {
        let query = format!(
            "releasegroup:\"{}\" AND artist:\"{}\"",
            escape(album),
            escape(artist)
        );
        let data = self.search("release-group", &query).await?;
        let search: ReleaseGroupSearch = serde_json::from_value(data)
            .map_err(|e| MetadataError::Provider(format!("musicbrainz: {e}")))?;
        Ok(best_hit(album, &search.release_groups))
    }
}

fn escape(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

/// An exact (normalized) name match wins; otherwise the top hit if it scores
/// at least [`MIN_SCORE`].
fn best_hit(name: &str, hits: &[Hit]) -> Option<String> {
    let wanted = normalize_title_for_match(name);
    hits.iter()
        .find(|h| normalize_title_for_match(&h.name) == wanted)
        .or_else(|| hits.iter().max_by_key(|h| h.score).filter(|h| h.score >= MIN_SCORE))
        .map(|h| h.id.clone())
}
