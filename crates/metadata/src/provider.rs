//! Capability traits the facade depends on.
//!
//! Each trait is implemented by one network client. Every method returns a
//! normalized [`Record`] (possibly empty) or an error; the facade turns errors
//! into empty records and moves on to its next strategy.

use std::collections::HashMap;

use artutils_core::{ExternalSource, MediaType, Record, Selector};

use crate::MetadataError;

/// Movie/TV details (TMDB).
#[async_trait::async_trait]
pub trait VideoDetailsProvider: Send + Sync {
    /// Resolve an external id (IMDb, TheTVDB) to full details.
    async fn details_by_external_id(
        &self,
        external_id: &str,
        source: ExternalSource,
    ) -> Result<Record, MetadataError>;

    /// Search movies; `selector` is set when the user wants to pick the match.
    async fn search_movie(
        &self,
        title: &str,
        year: Option<i32>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError>;

    async fn search_tvshow(
        &self,
        title: &str,
        year: Option<i32>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError>;

    /// Search movies and shows together, preferring `preftype` when given.
    async fn search_video(
        &self,
        title: &str,
        year: Option<i32>,
        preftype: Option<MediaType>,
        selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError>;
}

/// Artwork collections (fanart.tv).
#[async_trait::async_trait]
pub trait FanartProvider: Send + Sync {
    async fn movie(&self, imdb_id: &str) -> Result<Record, MetadataError>;
    async fn tvshow(&self, tvdb_id: &str) -> Result<Record, MetadataError>;
    async fn music_artist(&self, artist_mbid: &str) -> Result<Record, MetadataError>;
    async fn music_album(&self, album_mbid: &str) -> Result<Record, MetadataError>;
}

/// TV series details and air dates (TheTVDB).
#[async_trait::async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn series(&self, tvdb_id: &str) -> Result<Record, MetadataError>;
    async fn series_by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError>;
    /// The first episode airing today or within `days_ahead` days.
    async fn next_aired_episode(
        &self,
        tvdb_id: &str,
        days_ahead: u32,
    ) -> Result<Record, MetadataError>;
    /// The most recent episode that already aired.
    async fn last_episode(&self, tvdb_id: &str) -> Result<Record, MetadataError>;
}

/// Ratings and short details (OMDb).
#[async_trait::async_trait]
pub trait RatingsProvider: Send + Sync {
    async fn by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError>;
    async fn by_title(
        &self,
        title: &str,
        year: Option<i32>,
        media_type: MediaType,
    ) -> Result<Record, MetadataError>;
}

/// Chart positions (IMDb top 250).
#[async_trait::async_trait]
pub trait ChartProvider: Send + Sync {
    /// IMDb id → 1-based chart position.
    async fn top250(&self) -> Result<HashMap<String, u32>, MetadataError>;
}

/// Free-text image search (Google Images).
#[async_trait::async_trait]
pub trait ImageSearchProvider: Send + Sync {
    async fn search_images(&self, query: &str) -> Result<Vec<String>, MetadataError>;

    /// The first hit, or the one picked through `selector`.
    async fn search_image(
        &self,
        query: &str,
        selector: Option<&dyn Selector>,
    ) -> Result<Option<String>, MetadataError> {
        let images = self.search_images(query).await?;
        let Some(selector) = selector else {
            return Ok(images.into_iter().next());
        };
        let candidates: Vec<_> = images
            .iter()
            .map(|url| artutils_core::Candidate::new(url.clone()).with_thumb(Some(url.clone())))
            .collect();
        Ok(selector
            .select(&format!("{query} - Google"), &candidates)
            .and_then(|i| images.get(i).cloned()))
    }
}

/// Animated posters/fanart downloaded to local files.
#[async_trait::async_trait]
pub trait AnimatedArtProvider: Send + Sync {
    /// `{animatedposter, animatedfanart}` as local file paths.
    async fn animated_artwork(
        &self,
        imdb_id: &str,
        selector: Option<&dyn Selector>,
        ignore_cache: bool,
    ) -> Result<Record, MetadataError>;
}

/// MusicBrainz id resolution.
#[async_trait::async_trait]
pub trait MusicBrainzProvider: Send + Sync {
    async fn artist_id(&self, artist: &str) -> Result<Option<String>, MetadataError>;
    async fn album_id(&self, artist: &str, album: &str) -> Result<Option<String>, MetadataError>;
}

/// One hit from a title search, before full details are fetched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
    pub provider_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub media_type: MediaType,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
}
