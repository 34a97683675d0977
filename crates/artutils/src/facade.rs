//! `ArtUtils`: one entry point over every provider, with per-operation caching.
//!
//! Each public lookup returns a [`Record`], empty when nothing was found.
//! Provider failures are logged and degrade to an empty record so one broken
//! source never hides what the others found.

use std::path::Path;
use std::sync::Arc;

use artutils_cache::{CachePolicy, SimpleCache, cache_key};
use artutils_core::duration::{duration_from_minutes, parse_duration};
use artutils_core::strings::translate_status;
use artutils_core::types::is_imdb_id;
use artutils_core::{ExternalSource, LookupIds, MediaType, Record, Selector, StringTable};
use artutils_local::{ExtraFanartResolver, FfprobeReader, LogoResolver, StreamDetailsReader};
use artutils_metadata::ClientOptions;
use artutils_metadata::animatedart::AnimatedArtClient;
use artutils_metadata::fanarttv::FanartTvClient;
use artutils_metadata::google::GoogleImagesClient;
use artutils_metadata::imdb::ImdbChartClient;
use artutils_metadata::musicbrainz::MusicBrainzClient;
use artutils_metadata::omdb::OmdbClient;
use artutils_metadata::provider::{
    AnimatedArtProvider, ChartProvider, FanartProvider, ImageSearchProvider, MusicBrainzProvider,
    RatingsProvider, SeriesProvider, VideoDetailsProvider,
};
use artutils_metadata::tmdb::TmdbClient;
use artutils_metadata::tvdb::TvdbClient;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ArtUtilsConfig;

/// How far ahead TheTVDB is searched for the next episode.
pub const NEXT_EPISODE_DAYS_AHEAD: u32 = 365;

/// The provider clients the facade delegates to.
#[derive(Clone)]
pub struct Providers {
    pub video: Arc<dyn VideoDetailsProvider>,
    pub fanart: Arc<dyn FanartProvider>,
    pub series: Arc<dyn SeriesProvider>,
    pub ratings: Arc<dyn RatingsProvider>,
    pub chart: Arc<dyn ChartProvider>,
    pub images: Arc<dyn ImageSearchProvider>,
    pub animated: Arc<dyn AnimatedArtProvider>,
    pub musicbrainz: Arc<dyn MusicBrainzProvider>,
    pub streamdetails: Arc<dyn StreamDetailsReader>,
}

impl Providers {
    /// The network clients and the ffprobe reader, configured from `config`.
    /// Clients that cache on their own share `cache`.
    pub fn from_config(config: &ArtUtilsConfig, cache: &Arc<SimpleCache>) -> Self {
        let timeout = config.request_timeout;
        let options = |name: &str, key: &Option<String>| {
            if key.is_none() {
                warn!(provider = name, "no API key configured; lookups will fail");
            }
            ClientOptions::new(key.clone().unwrap_or_default())
                .with_language(config.language.clone())
                .with_timeout(timeout)
        };

        Self {
            video: Arc::new(TmdbClient::new(options("tmdb", &config.tmdb_key))),
            fanart: Arc::new(FanartTvClient::new(options("fanart.tv", &config.fanarttv_key))),
            series: Arc::new(TvdbClient::new(options("tvdb", &config.tvdb_key))),
            ratings: Arc::new(OmdbClient::new(options("omdb", &config.omdb_key))),
            chart: Arc::new(ImdbChartClient::new(timeout).with_cache(cache.clone())),
            images: Arc::new(GoogleImagesClient::new(timeout).with_cache(cache.clone())),
            animated: Arc::new(
                AnimatedArtClient::new(config.animated_art_dir.clone(), timeout)
                    .with_cache(cache.clone()),
            ),
            musicbrainz: Arc::new(MusicBrainzClient::new(timeout)),
            streamdetails: Arc::new(FfprobeReader::new(config.ffprobe_path.clone())),
        }
    }
}

pub struct ArtUtils {
    pub(crate) config: ArtUtilsConfig,
    pub(crate) cache: Arc<SimpleCache>,
    pub(crate) providers: Providers,
    strings: Arc<dyn StringTable>,
    selector: Arc<dyn Selector>,
    extrafanart: ExtraFanartResolver,
    studio_logos: LogoResolver,
    channel_logos: LogoResolver,
}

impl ArtUtils {
    pub fn new(
        config: ArtUtilsConfig,
        cache: Arc<SimpleCache>,
        providers: Providers,
        strings: Arc<dyn StringTable>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        Self {
            studio_logos: LogoResolver::new(config.studio_logos_path.clone()),
            channel_logos: LogoResolver::new(config.channel_logos_path.clone()),
            extrafanart: ExtraFanartResolver::new(),
            config,
            cache,
            providers,
            strings,
            selector,
        }
    }

    /// Open the configured cache and build the real provider clients.
    pub async fn from_config(
        config: ArtUtilsConfig,
        strings: Arc<dyn StringTable>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let cache = Arc::new(SimpleCache::open(&config.cache_db.to_string_lossy()).await);
        let providers = Providers::from_config(&config, &cache);
        Self::new(config, cache, providers, strings, selector)
    }

    pub fn config(&self) -> &ArtUtilsConfig {
        &self.config
    }

    pub fn cache(&self) -> &SimpleCache {
        &self.cache
    }

    pub(crate) fn selector(&self, manual_select: bool) -> Option<&dyn Selector> {
        manual_select.then_some(&*self.selector)
    }

    /// Movie or TV details from TMDB.
    ///
    /// Tries, in order: IMDb id, TheTVDB id, then a title search whose kind
    /// follows `media_type` (movie search, TV search, or a combined search
    /// preferring `preftype`). `ignore_cache` replaces the stored entry.
    pub async fn get_tmdb_details(
        &self,
        ids: &LookupIds,
        media_type: MediaType,
        manual_select: bool,
        preftype: Option<MediaType>,
        ignore_cache: bool,
    ) -> Record {
        let ids = ids.normalized();
        if ids.is_empty() {
            return Record::new();
        }
        let key = op_key(
            "get_tmdb_details",
            &(&ids, media_type, manual_select, preftype),
        );

        let policy = CachePolicy::days(14).ignore_cache(ignore_cache);

        self.cache
            .cached(&key, policy, || async {
                let video = &self.providers.video;
                let selector = self.selector(manual_select);
                let result = if let Some(imdb_id) = ids.imdb_id() {
                    video.details_by_external_id(imdb_id, ExternalSource::Imdb).await
                } else if let Some(tvdb_id) = ids.tvdb_id() {
                    video.details_by_external_id(tvdb_id, ExternalSource::Tvdb).await
                } else if let Some(title) = ids.title() {
                    if media_type.is_movie() {
                        video.search_movie(title, ids.year, selector).await
                    } else if media_type == MediaType::TvShow {
                        video.search_tvshow(title, ids.year, selector).await
                    } else {
                        video.search_video(title, ids.year, preftype, selector).await
                    }
                } else {
                    Ok(Record::new())
                };
                let subject = format!("{ids:?}");
                self.localize(or_empty("tmdb details", &subject, result))
            })
            .await
    }

    /// fanart.tv artwork as `{art: {...}}`.
    ///
    /// TV lookups need a TheTVDB id: an `imdb_id` without the `tt` prefix is
    /// taken to be one, a real IMDb id is resolved through TheTVDB.
    pub async fn get_extended_artwork(
        &self,
        imdb_id: Option<&str>,
        tvdb_id: Option<&str>,
        media_type: MediaType,
        ignore_cache: bool,
    ) -> Record {
        let (imdb_id, tvdb_id) = (non_blank(imdb_id), non_blank(tvdb_id));
        if imdb_id.is_none() && tvdb_id.is_none() {
            return Record::new();
        }
        let key = op_key("get_extended_artwork", &(imdb_id, tvdb_id, media_type));
        let policy = CachePolicy::days(14).ignore_cache(ignore_cache);

        self.cache
            .cached(&key, policy, || async {
                let art = if media_type.is_movie() {
                    match imdb_id {
                        Some(imdb_id) => or_empty(
                            "fanart.tv movie",
                            imdb_id,
                            self.providers.fanart.movie(imdb_id).await,
                        ),
                        None => Record::new(),
                    }
                } else if media_type.is_tv() {
                    match self.resolve_tvdb_id(imdb_id, tvdb_id).await {
                        Some(tvdb_id) => or_empty(
                            "fanart.tv tvshow",
                            &tvdb_id,
                            self.providers.fanart.tvshow(&tvdb_id).await,
                        ),
                        None => Record::new(),
                    }
                } else {
                    Record::new()
                };

                let mut result = Record::new();
                result.insert_opt("art", Some(art));
                result
            })
            .await
    }

    /// TheTVDB series details plus `nextepisode` (continuing shows only) and
    /// `lastepisode`.
    pub async fn get_tvdb_details(&self, imdb_id: Option<&str>, tvdb_id: Option<&str>) -> Record {
        let (imdb_id, tvdb_id) = (non_blank(imdb_id), non_blank(tvdb_id));
        if imdb_id.is_none() && tvdb_id.is_none() {
            return Record::new();
        }
        let key = op_key("get_tvdb_details", &(imdb_id, tvdb_id));

        self.cache
            .cached(&key, CachePolicy::days(1), || async {
                let series = &self.providers.series;
                let tvdb_id = tvdb_id.or(imdb_id.filter(|id| !is_imdb_id(id)));
                let result = match (tvdb_id, imdb_id) {
                    (Some(tvdb_id), _) => series.series(tvdb_id).await,
                    (None, Some(imdb_id)) => series.series_by_imdb_id(imdb_id).await,
                    (None, None) => Ok(Record::new()),
                };
                let subject = tvdb_id.or(imdb_id).unwrap_or_default();
                let mut result = or_empty("tvdb series", subject, result);
                if result.is_empty() {
                    return result;
                }

                if let Some(id) = result.get_str("tvdb_id").map(str::to_string) {
                    if result.get_str("status") == Some("Continuing") {
                        let next = series
                            .next_aired_episode(&id, NEXT_EPISODE_DAYS_AHEAD)
                            .await;
                        let next = or_empty("tvdb next episode", &id, next);
                        result.insert_opt("nextepisode", Some(next));
                    }
                    let last = series.last_episode(&id).await;
                    let last = or_empty("tvdb last episode", &id, last);
                    result.insert_opt("lastepisode", Some(last));
                }
                self.localize(result)
            })
            .await
    }

    /// OMDb details and ratings, by IMDb id or by title.
    pub async fn get_omdb_info(
        &self,
        imdb_id: Option<&str>,
        title: Option<&str>,
        year: Option<i32>,
        media_type: MediaType,
        ignore_cache: bool,
    ) -> Record {
        let imdb_id = non_blank(imdb_id);
        let title = non_blank(title.map(|t| t.split(" (").next().unwrap_or(t)));
        if imdb_id.is_none() && title.is_none() {
            return Record::new();
        }
        let key = op_key("get_omdb_info", &(imdb_id, title, year, media_type));
        let policy = CachePolicy::days(14).ignore_cache(ignore_cache);

        self.cache
            .cached(&key, policy, || async {
                let ratings = &self.providers.ratings;
                let result = match (imdb_id, title, year) {
                    (Some(imdb_id), _, _) => ratings.by_imdb_id(imdb_id).await,
                    (None, Some(title), _) if media_type.is_tv() => {
                        ratings.by_title(title, None, MediaType::TvShow).await
                    }
                    (None, Some(title), Some(year)) => {
                        ratings.by_title(title, Some(year), media_type).await
                    }
                    _ => Ok(Record::new()),
                };
                let subject = imdb_id.or(title).unwrap_or_default();
                self.localize(or_empty("omdb", subject, result))
            })
            .await
    }

    /// `{"IMDB.Top250": position}` when the title is in the IMDb top 250.
    pub async fn get_top250_rating(&self, imdb_id: &str) -> Record {
        let Some(imdb_id) = non_blank(Some(imdb_id)) else {
            return Record::new();
        };
        let key = op_key("get_top250_rating", &imdb_id);

        self.cache
            .cached(&key, CachePolicy::days(7), || async {
                let chart = or_empty("imdb top250", imdb_id, self.providers.chart.top250().await);
                let mut result = Record::new();
                result.insert_opt("IMDB.Top250", chart.get(imdb_id).copied());
                result
            })
            .await
    }

    /// Animated poster and fanart as local files.
    ///
    /// A cached result whose files have since disappeared is fetched again,
    /// once, bypassing every cache.
    pub async fn get_animated_artwork(
        &self,
        imdb_id: &str,
        ignore_cache: bool,
        manual_select: bool,
    ) -> Record {
        let Some(imdb_id) = non_blank(Some(imdb_id)) else {
            return Record::new();
        };
        let key = op_key("get_animated_artwork", &(imdb_id, manual_select));
        let fetch = |bypass: bool| async move {
            let result = self
                .providers
                .animated
                .animated_artwork(imdb_id, self.selector(manual_select), bypass)
                .await;
            or_empty("animated artwork", imdb_id, result)
        };

        let policy = CachePolicy::days(1).ignore_cache(ignore_cache);
        let artwork = self.cache.cached(&key, policy, || fetch(ignore_cache)).await;
        if !missing_local_file(&artwork).await {
            return artwork;
        }

        info!(imdb_id, "animated artwork missing on disk, refreshing");
        let policy = CachePolicy::days(1).ignore_cache(true);
        self.cache.cached(&key, policy, || fetch(true)).await
    }

    /// The `extrafanart` folder for a media file. The cache entry is tied to
    /// whether the folder exists, so creating or removing it invalidates it.
    pub async fn get_extrafanart(&self, file_path: &str, media_type: MediaType) -> Record {
        if file_path.trim().is_empty() {
            return Record::new();
        }
        let exists = self.extrafanart.locate(file_path, media_type).await.is_some();
        let key = op_key("get_extrafanart", &(file_path, media_type));
        let policy = CachePolicy::days(14).checksum(exists.to_string());

        self.cache
            .cached(&key, policy, || async {
                match self.extrafanart.resolve(file_path, media_type).await {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(file_path, error = %err, "extrafanart lookup failed");
                        Record::new()
                    }
                }
            })
            .await
    }

    /// Codec, resolution, and language summary for a local media file.
    pub async fn get_streamdetails(&self, file_path: &str, ignore_cache: bool) -> Record {
        if file_path.trim().is_empty() {
            return Record::new();
        }
        let key = op_key("get_streamdetails", &file_path);
        let policy = CachePolicy::days(14).ignore_cache(ignore_cache);

        self.cache
            .cached(&key, policy, || async {
                match self.providers.streamdetails.read(Path::new(file_path)).await {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(file_path, error = %err, "stream details unavailable");
                        Record::new()
                    }
                }
            })
            .await
    }

    /// `{channellogo}` from the local logo folder, else an image search.
    pub async fn get_channellogo(&self, channel: &str) -> Record {
        let Some(channel) = non_blank(Some(channel)) else {
            return Record::new();
        };
        let key = op_key("get_channellogo", &channel);

        self.cache
            .cached(&key, CachePolicy::days(14), || async {
                let logo = match self.channel_logos.resolve(channel) {
                    Some(local) => Some(local),
                    None => {
                        let query = format!("{channel} logo");
                        let found = self.providers.images.search_image(&query, None).await;
                        or_empty("channel logo search", channel, found)
                    }
                };
                let mut result = Record::new();
                result.insert_opt("channellogo", logo);
                result
            })
            .await
    }

    /// `{studiologo}` from the configured studio logo folder. Not cached.
    pub fn get_studio_logo(&self, studio: &str) -> Record {
        let mut result = Record::new();
        result.insert_opt("studiologo", self.studio_logos.resolve_studio(studio));
        result
    }

    /// `"H:MM"` or plain minutes → `Duration`, `Duration.Hours`,
    /// `Duration.Minutes`, `Runtime`.
    pub fn get_duration(&self, duration: &str) -> Record {
        parse_duration(duration)
    }

    pub fn translate_string(&self, s: &str) -> String {
        translate_status(self.strings.as_ref(), s)
    }

    /// Housekeeping and final flush of the cache.
    pub async fn close(self) {
        if let Some(removed) = self.cache.maybe_cleanup().await {
            debug!(removed, "expired cache entries removed");
        }
        self.cache.close().await;
        info!("artutils closed");
    }

    pub(crate) async fn resolve_tvdb_id(
        &self,
        imdb_id: Option<&str>,
        tvdb_id: Option<&str>,
    ) -> Option<String> {
        if let Some(tvdb_id) = tvdb_id {
            return Some(tvdb_id.to_string());
        }
        let imdb_id = imdb_id?;
        if !is_imdb_id(imdb_id) {
            return Some(imdb_id.to_string());
        }
        let series = self.providers.series.series_by_imdb_id(imdb_id).await;
        or_empty("tvdb id lookup", imdb_id, series)
            .get_str("tvdb_id")
            .map(str::to_string)
    }

    /// Localized status plus runtime (provider seconds) as minutes with the
    /// duration breakdown.
    fn localize(&self, mut record: Record) -> Record {
        if let Some(status) = record.get_str("status").map(str::to_string) {
            record.insert("status", self.translate_string(&status));
        }
        let runtime_secs = record.get("runtime").and_then(|r| {
            r.as_u64()
                .or_else(|| r.as_f64().filter(|s| *s >= 0.0).map(|s| s as u64))
        });
        if let Some(secs) = runtime_secs {
            let minutes = secs / 60;
            record.insert("runtime", minutes);
            for (key, value) in duration_from_minutes(minutes).iter() {
                record.insert(key.clone(), value.clone());
            }
        }
        record
    }
}

/// Cache key for a facade operation.
pub(crate) fn op_key<A: Serialize + ?Sized>(op: &str, args: &A) -> String {
    cache_key(&format!("ArtUtils.{op}"), args)
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Log a provider failure and carry on with nothing.
pub(crate) fn or_empty<T: Default, E: std::fmt::Display>(
    what: &str,
    subject: &str,
    result: Result<T, E>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(lookup = what, subject, error = %err, "provider lookup failed");
            T::default()
        }
    }
}

/// True when an animated artwork entry names a local file that is gone.
/// Remote URLs are trusted.
async fn missing_local_file(artwork: &Record) -> bool {
    for key in ["animatedposter", "animatedfanart"] {
        let Some(path) = artwork.get(key).and_then(Value::as_str) else {
            continue;
        };
        if path.starts_with("http://") || path.starts_with("https://") {
            continue;
        }
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return true;
        }
    }
    false
}
