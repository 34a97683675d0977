use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use artutils::{ArtUtils, ArtUtilsConfig, NEXT_EPISODE_DAYS_AHEAD, Providers};
use artutils_cache::SimpleCache;
use artutils_core::strings::{STATUS_CONTINUING, STATUS_ENDED};
use artutils_core::{AutoSelect, ExternalSource, LookupIds, MediaType, Record, Selector};
use artutils_local::{LocalError, StreamDetailsReader};
use artutils_metadata::MetadataError;
use artutils_metadata::provider::{
    AnimatedArtProvider, ChartProvider, FanartProvider, ImageSearchProvider, MusicBrainzProvider,
    RatingsProvider, SeriesProvider, VideoDetailsProvider,
};
use serde_json::{Value, json};

/// Canned answers for every provider, with a log of the calls made.
#[derive(Default)]
struct Fake {
    calls: Mutex<Vec<String>>,
    fail: bool,
    video: Record,
    series: Record,
    next: Record,
    last: Record,
    ratings: Record,
    fanart_movie: Record,
    fanart_tv: Record,
    fanart_artist: Record,
    fanart_album: Record,
    chart: HashMap<String, u32>,
    images: Vec<String>,
    animated: Record,
}

impl Fake {
    fn log(&self, call: impl Into<String>) -> Result<(), MetadataError> {
        self.calls.lock().unwrap().push(call.into());
        if self.fail {
            Err(MetadataError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

fn record(value: Value) -> Record {
    Record::from_value(value)
}

#[async_trait::async_trait]
impl VideoDetailsProvider for Fake {
    async fn details_by_external_id(
        &self,
        external_id: &str,
        source: ExternalSource,
    ) -> Result<Record, MetadataError> {
        self.log(format!("tmdb.external:{source}:{external_id}"))?;
        Ok(self.video.clone())
    }

    async fn search_movie(
        &self,
        title: &str,
        _year: Option<i32>,
        _selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        self.log(format!("tmdb.search_movie:{title}"))?;
        Ok(self.video.clone())
    }

    async fn search_tvshow(
        &self,
        title: &str,
        _year: Option<i32>,
        _selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        self.log(format!("tmdb.search_tvshow:{title}"))?;
        Ok(self.video.clone())
    }

    async fn search_video(
        &self,
        title: &str,
        _year: Option<i32>,
        _preftype: Option<MediaType>,
        _selector: Option<&dyn Selector>,
    ) -> Result<Record, MetadataError> {
        self.log(format!("tmdb.search_video:{title}"))?;
        Ok(self.video.clone())
    }
}

#[async_trait::async_trait]
impl FanartProvider for Fake {
    async fn movie(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("fanart.movie:{imdb_id}"))?;
        Ok(self.fanart_movie.clone())
    }

    async fn tvshow(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("fanart.tvshow:{tvdb_id}"))?;
        Ok(self.fanart_tv.clone())
    }

    async fn music_artist(&self, artist_mbid: &str) -> Result<Record, MetadataError> {
        self.log(format!("fanart.artist:{artist_mbid}"))?;
        Ok(self.fanart_artist.clone())
    }

    async fn music_album(&self, album_mbid: &str) -> Result<Record, MetadataError> {
        self.log(format!("fanart.album:{album_mbid}"))?;
        Ok(self.fanart_album.clone())
    }
}

#[async_trait::async_trait]
impl SeriesProvider for Fake {
    async fn series(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("tvdb.series:{tvdb_id}"))?;
        Ok(self.series.clone())
    }

    async fn series_by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("tvdb.by_imdb:{imdb_id}"))?;
        Ok(self.series.clone())
    }

    async fn next_aired_episode(
        &self,
        tvdb_id: &str,
        days_ahead: u32,
    ) -> Result<Record, MetadataError> {
        self.log(format!("tvdb.next:{tvdb_id}:{days_ahead}"))?;
        Ok(self.next.clone())
    }

    async fn last_episode(&self, tvdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("tvdb.last:{tvdb_id}"))?;
        Ok(self.last.clone())
    }
}

#[async_trait::async_trait]
impl RatingsProvider for Fake {
    async fn by_imdb_id(&self, imdb_id: &str) -> Result<Record, MetadataError> {
        self.log(format!("omdb.imdb:{imdb_id}"))?;
        Ok(self.ratings.clone())
    }

    async fn by_title(
        &self,
        title: &str,
        year: Option<i32>,
        media_type: MediaType,
    ) -> Result<Record, MetadataError> {
        self.log(format!("omdb.title:{title}:{year:?}:{media_type}"))?;
        Ok(self.ratings.clone())
    }
}

#[async_trait::async_trait]
impl ChartProvider for Fake {
    async fn top250(&self) -> Result<HashMap<String, u32>, MetadataError> {
        self.log("imdb.top250")?;
        Ok(self.chart.clone())
    }
}

#[async_trait::async_trait]
impl ImageSearchProvider for Fake {
    async fn search_images(&self, query: &str) -> Result<Vec<String>, MetadataError> {
        self.log(format!("images:{query}"))?;
        Ok(self.images.clone())
    }
}

#[async_trait::async_trait]
impl AnimatedArtProvider for Fake {
    async fn animated_artwork(
        &self,
        imdb_id: &str,
        _selector: Option<&dyn Selector>,
        ignore_cache: bool,
    ) -> Result<Record, MetadataError> {
        self.log(format!("animated:{imdb_id}:{ignore_cache}"))?;
        Ok(self.animated.clone())
    }
}

#[async_trait::async_trait]
impl MusicBrainzProvider for Fake {
    async fn artist_id(&self, artist: &str) -> Result<Option<String>, MetadataError> {
        self.log(format!("mb.artist:{artist}"))?;
        Ok(Some("artist-mbid".to_string()))
    }

    async fn album_id(&self, artist: &str, album: &str) -> Result<Option<String>, MetadataError> {
        self.log(format!("mb.album:{artist}:{album}"))?;
        Ok(Some("album-mbid".to_string()))
    }
}

#[async_trait::async_trait]
impl StreamDetailsReader for Fake {
    async fn read(&self, file: &Path) -> Result<Record, LocalError> {
        self.log(format!("streamdetails:{}", file.display()))
            .map_err(|e| LocalError::Probe(e.to_string()))?;
        Ok(record(json!({ "videocodec": "h264", "videoresolution": "1080" })))
    }
}

fn utils(fake: &Arc<Fake>) -> ArtUtils {
    let providers = Providers {
        video: fake.clone(),
        fanart: fake.clone(),
        series: fake.clone(),
        ratings: fake.clone(),
        chart: fake.clone(),
        images: fake.clone(),
        animated: fake.clone(),
        musicbrainz: fake.clone(),
        streamdetails: fake.clone(),
    };
    let strings: HashMap<u32, String> = HashMap::from([
        (STATUS_CONTINUING, "Lopend".to_string()),
        (STATUS_ENDED, "Beëindigd".to_string()),
    ]);
    ArtUtils::new(
        ArtUtilsConfig::default(),
        Arc::new(SimpleCache::in_memory()),
        providers,
        Arc::new(strings),
        Arc::new(AutoSelect),
    )
}

fn movie() -> Record {
    record(json!({
        "title": "The Matrix",
        "media_type": "movie",
        "imdbnumber": "tt0133093",
        "runtime": 8160,
        "status": "Released",
        "art": { "poster": "https://image.tmdb.org/matrix.jpg" }
    }))
}

#[tokio::test]
async fn title_only_lookup_searches_by_kind() {
    let fake = Arc::new(Fake {
        video: movie(),
        ..Default::default()
    });
    let utils = utils(&fake);

    let ids = LookupIds::new().with_title("The Matrix (1999)");
    let details = utils
        .get_tmdb_details(&ids, MediaType::Movie, false, None, false)
        .await;

    assert_eq!(fake.calls(), vec!["tmdb.search_movie:The Matrix"]);
    assert_eq!(details.get("runtime"), Some(&json!(136)));
    assert_eq!(details.get_str("Duration"), Some("2:16"));
    assert_eq!(details.get_str("Runtime"), Some("136"));
    // no table entry for "Released": passes through
    assert_eq!(details.get_str("status"), Some("Released"));

    utils
        .get_tmdb_details(&LookupIds::new().with_title("Dark"), MediaType::TvShow, false, None, false)
        .await;
    utils
        .get_tmdb_details(&LookupIds::new().with_title("Heat"), MediaType::Other, false, None, false)
        .await;
    assert_eq!(fake.count("tmdb.search_tvshow:Dark"), 1);
    assert_eq!(fake.count("tmdb.search_video:Heat"), 1);
}

#[tokio::test]
async fn external_ids_take_precedence_over_title() {
    let fake = Arc::new(Fake {
        video: movie(),
        ..Default::default()
    });
    let utils = utils(&fake);

    let ids = LookupIds::new()
        .with_imdb_id("tt0133093")
        .with_tvdb_id("169")
        .with_title("The Matrix");
    utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await;

    let ids = LookupIds::new().with_tvdb_id("81189").with_title("Breaking Bad");
    utils.get_tmdb_details(&ids, MediaType::TvShow, false, None, false).await;

    assert_eq!(
        fake.calls(),
        vec!["tmdb.external:imdb_id:tt0133093", "tmdb.external:tvdb_id:81189"]
    );
}

#[tokio::test]
async fn cache_hit_skips_the_provider() {
    let fake = Arc::new(Fake {
        video: movie(),
        ..Default::default()
    });
    let utils = utils(&fake);
    let ids = LookupIds::new().with_imdb_id("tt0133093");

    let first = utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await;
    let second = utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await;

    assert_eq!(first, second);
    assert_eq!(fake.count("tmdb."), 1);
}

#[tokio::test]
async fn failing_provider_yields_empty_and_is_retried() {
    let fake = Arc::new(Fake {
        fail: true,
        ..Default::default()
    });
    let utils = utils(&fake);
    let ids = LookupIds::new().with_imdb_id("tt0133093");

    assert!(utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await.is_empty());
    assert!(utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await.is_empty());
    assert!(utils.get_omdb_info(Some("tt0133093"), None, None, MediaType::Movie, false).await.is_empty());
    assert!(utils.get_top250_rating("tt0133093").await.is_empty());

    // empty results are never stored
    assert_eq!(fake.count("tmdb."), 2);
}

#[tokio::test]
async fn blank_input_makes_no_calls() {
    let fake = Arc::new(Fake::default());
    let utils = utils(&fake);

    assert!(utils.get_tmdb_details(&LookupIds::new(), MediaType::Movie, false, None, false).await.is_empty());
    assert!(utils.get_extended_artwork(Some("  "), None, MediaType::Movie, false).await.is_empty());
    assert!(utils.get_tvdb_details(None, Some("")).await.is_empty());
    assert!(utils.get_omdb_info(None, None, Some(1999), MediaType::Movie, false).await.is_empty());
    assert!(utils.get_animated_artwork(" ", false, false).await.is_empty());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn tv_artwork_uses_a_bare_id_as_tvdb_id() {
    let fake = Arc::new(Fake {
        fanart_tv: record(json!({ "clearlogo": "logo.png" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    let art = utils
        .get_extended_artwork(Some("121361"), None, MediaType::TvShow, false)
        .await;

    assert_eq!(fake.calls(), vec!["fanart.tvshow:121361"]);
    assert_eq!(art.get("art"), Some(&json!({ "clearlogo": "logo.png" })));
}

#[tokio::test]
async fn tv_artwork_resolves_imdb_id_through_tvdb() {
    let fake = Arc::new(Fake {
        series: record(json!({ "tvdb_id": "121361", "title": "Game of Thrones" })),
        fanart_tv: record(json!({ "clearlogo": "logo.png" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    utils
        .get_extended_artwork(Some("tt0944947"), None, MediaType::Episode, false)
        .await;

    assert_eq!(
        fake.calls(),
        vec!["tvdb.by_imdb:tt0944947", "fanart.tvshow:121361"]
    );
}

#[tokio::test]
async fn movie_artwork_without_imdb_id_is_empty() {
    let fake = Arc::new(Fake {
        fanart_movie: record(json!({ "clearlogo": "logo.png" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    assert!(utils.get_extended_artwork(None, Some("169"), MediaType::Movie, false).await.is_empty());
    let art = utils.get_extended_artwork(Some("tt0133093"), None, MediaType::Movie, false).await;
    assert_eq!(art.get_record("art").get_str("clearlogo"), Some("logo.png"));
    assert_eq!(fake.calls(), vec!["fanart.movie:tt0133093"]);
}

#[tokio::test]
async fn continuing_series_gets_next_and_last_episode() {
    let fake = Arc::new(Fake {
        series: record(json!({ "tvdb_id": "81189", "status": "Continuing", "runtime": 2700 })),
        next: record(json!({ "label": "6x01" })),
        last: record(json!({ "label": "5x16" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    let details = utils.get_tvdb_details(Some("tt0903747"), None).await;

    assert_eq!(
        fake.calls(),
        vec![
            "tvdb.by_imdb:tt0903747".to_string(),
            format!("tvdb.next:81189:{NEXT_EPISODE_DAYS_AHEAD}"),
            "tvdb.last:81189".to_string(),
        ]
    );
    assert_eq!(details.get_str("status"), Some("Lopend"));
    assert_eq!(details.get("runtime"), Some(&json!(45)));
    assert_eq!(details.get_record("nextepisode").get_str("label"), Some("6x01"));
    assert_eq!(details.get_record("lastepisode").get_str("label"), Some("5x16"));
}

#[tokio::test]
async fn ended_series_only_gets_last_episode() {
    let fake = Arc::new(Fake {
        series: record(json!({ "tvdb_id": "81189", "status": "Ended" })),
        last: record(json!({ "label": "5x16" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    let details = utils.get_tvdb_details(None, Some("81189")).await;

    assert_eq!(fake.calls(), vec!["tvdb.series:81189", "tvdb.last:81189"]);
    assert_eq!(details.get_str("status"), Some("Beëindigd"));
    assert!(!details.contains("nextepisode"));
}

#[tokio::test]
async fn omdb_prefers_imdb_id_and_needs_year_for_movie_titles() {
    let fake = Arc::new(Fake {
        ratings: record(json!({ "rating.imdb": "8.7" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    utils
        .get_omdb_info(Some("tt0133093"), Some("The Matrix"), Some(1999), MediaType::Movie, false)
        .await;
    assert!(utils.get_omdb_info(None, Some("Heat"), None, MediaType::Movie, false).await.is_empty());
    utils.get_omdb_info(None, Some("Heat (1995)"), Some(1995), MediaType::Movie, false).await;
    utils.get_omdb_info(None, Some("Dark"), None, MediaType::Episode, false).await;

    assert_eq!(
        fake.calls(),
        vec![
            "omdb.imdb:tt0133093",
            "omdb.title:Heat:Some(1995):movie",
            "omdb.title:Dark:None:tvshow",
        ]
    );
}

#[tokio::test]
async fn top250_position() {
    let fake = Arc::new(Fake {
        chart: HashMap::from([("tt0111161".to_string(), 1), ("tt0068646".to_string(), 2)]),
        ..Default::default()
    });
    let utils = utils(&fake);

    let rating = utils.get_top250_rating("tt0068646").await;
    assert_eq!(rating.get("IMDB.Top250"), Some(&json!(2)));
    assert!(utils.get_top250_rating("tt0133093").await.is_empty());
}

#[tokio::test]
async fn animated_artwork_with_missing_file_is_refreshed_once() {
    let fake = Arc::new(Fake {
        animated: record(json!({ "animatedposter": "/nonexistent/tt0133093_poster.gif" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    let art = utils.get_animated_artwork("tt0133093", false, false).await;

    assert_eq!(
        fake.calls(),
        vec!["animated:tt0133093:false", "animated:tt0133093:true"]
    );
    assert_eq!(
        art.get_str("animatedposter"),
        Some("/nonexistent/tt0133093_poster.gif")
    );
}

#[tokio::test]
async fn animated_artwork_on_disk_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let poster = dir.path().join("tt0133093_poster.gif");
    std::fs::write(&poster, b"GIF89a").unwrap();

    let fake = Arc::new(Fake {
        animated: record(json!({ "animatedposter": poster.to_string_lossy() })),
        ..Default::default()
    });
    let utils = utils(&fake);

    utils.get_animated_artwork("tt0133093", false, false).await;
    utils.get_animated_artwork("tt0133093", false, false).await;

    assert_eq!(fake.calls(), vec!["animated:tt0133093:false"]);
}

#[tokio::test]
async fn pvr_entry_combines_sources() {
    let fake = Arc::new(Fake {
        video: movie(),
        fanart_movie: record(json!({ "clearlogo": "matrix-logo.png" })),
        ratings: record(json!({ "rating.imdb": "8.7" })),
        images: vec!["https://logos.example/rtl4.png".to_string()],
        ..Default::default()
    });
    let utils = utils(&fake);

    let entry = utils
        .get_pvr_artwork("The Matrix (1999)", "RTL 4", "Movie / Drama", false, false)
        .await;

    let art = entry.get_record("art");
    assert_eq!(art.get_str("thumb"), Some("https://image.tmdb.org/matrix.jpg"));
    assert_eq!(art.get_str("clearlogo"), Some("matrix-logo.png"));
    assert_eq!(art.get_str("channellogo"), Some("https://logos.example/rtl4.png"));
    assert_eq!(entry.get_str("rating.imdb"), Some("8.7"));
    assert_eq!(entry.get_str("pvrtitle"), Some("The Matrix"));
    assert_eq!(entry.get_str("pvrchannel"), Some("RTL 4"));
    assert_eq!(fake.count("tmdb.search_movie:The Matrix"), 1);
    assert_eq!(fake.count("images:RTL 4 logo"), 1);
}

#[tokio::test]
async fn pvr_manual_select_and_refresh_reach_every_provider() {
    let fake = Arc::new(Fake {
        video: movie(),
        fanart_movie: record(json!({ "clearlogo": "matrix-logo.png" })),
        ratings: record(json!({ "rating.imdb": "8.7" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    utils.get_pvr_artwork("The Matrix", "RTL 4", "Movie", true, false).await;
    utils.get_pvr_artwork("The Matrix", "RTL 4", "Movie", true, true).await;
    assert_eq!(fake.count("tmdb.search_movie:The Matrix"), 2);
    assert_eq!(fake.count("fanart.movie:tt0133093"), 2);
    assert_eq!(fake.count("omdb.imdb:tt0133093"), 2);

    // a plain lookup is served from the entry the refresh stored
    utils.get_pvr_artwork("The Matrix", "RTL 4", "Movie", false, false).await;
    assert_eq!(fake.count("tmdb.search_movie:The Matrix"), 2);

    utils.get_pvr_artwork("The Matrix", "RTL 4", "Movie", false, true).await;
    assert_eq!(fake.count("tmdb.search_movie:The Matrix"), 3);
    assert_eq!(fake.count("omdb.imdb:tt0133093"), 3);
}

#[tokio::test]
async fn ignore_cache_refetches_tmdb_details() {
    let fake = Arc::new(Fake {
        video: movie(),
        ..Default::default()
    });
    let utils = utils(&fake);
    let ids = LookupIds::new().with_imdb_id("tt0133093");

    utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await;
    utils.get_tmdb_details(&ids, MediaType::Movie, false, None, true).await;
    utils.get_tmdb_details(&ids, MediaType::Movie, false, None, false).await;

    assert_eq!(fake.count("tmdb.external:imdb_id:tt0133093"), 2);
}

#[tokio::test]
async fn pvr_entry_with_nothing_found_is_not_cached() {
    let fake = Arc::new(Fake::default());
    let utils = utils(&fake);

    assert!(utils.get_pvr_artwork("News", "", "News", false, false).await.is_empty());
    assert!(utils.get_pvr_artwork("News", "", "News", false, false).await.is_empty());
    assert_eq!(fake.count("tmdb.search_video:News"), 2);
}

#[tokio::test]
async fn music_album_art_wins_over_artist_art() {
    let fake = Arc::new(Fake {
        fanart_artist: record(json!({ "thumb": "artist.jpg", "fanart": "artist-fanart.jpg" })),
        fanart_album: record(json!({ "thumb": "cover.jpg", "discart": "cd.png" })),
        ..Default::default()
    });
    let utils = utils(&fake);

    let music = utils
        .get_music_artwork("Daft Punk", Some("Discovery"), Some("One More Time"), Some("1"), false)
        .await;

    let art = music.get_record("art");
    assert_eq!(art.get_str("thumb"), Some("cover.jpg"));
    assert_eq!(art.get_str("folder"), Some("cover.jpg"));
    assert_eq!(art.get_str("discart"), Some("cd.png"));
    assert_eq!(art.get_str("fanart"), Some("artist-fanart.jpg"));
    assert_eq!(music.get_str("musicbrainzartistid"), Some("artist-mbid"));
    assert_eq!(music.get_str("musicbrainzalbumid"), Some("album-mbid"));
    assert_eq!(music.get_str("track"), Some("One More Time"));
    assert_eq!(music.get_str("disc"), Some("1"));
    assert_eq!(fake.count("images:"), 0);
}

#[tokio::test]
async fn channel_logo_falls_back_to_image_search() {
    let fake = Arc::new(Fake {
        images: vec!["https://logos.example/bbc-one.png".to_string()],
        ..Default::default()
    });
    let utils = utils(&fake);

    let logo = utils.get_channellogo("BBC One").await;
    utils.get_channellogo("BBC One").await;

    assert_eq!(logo.get_str("channellogo"), Some("https://logos.example/bbc-one.png"));
    assert_eq!(fake.calls(), vec!["images:BBC One logo"]);
}

#[tokio::test]
async fn streamdetails_are_cached_unless_ignored() {
    let fake = Arc::new(Fake::default());
    let utils = utils(&fake);

    let details = utils.get_streamdetails("/media/movie.mkv", false).await;
    utils.get_streamdetails("/media/movie.mkv", false).await;
    utils.get_streamdetails("/media/movie.mkv", true).await;

    assert_eq!(details.get_str("videoresolution"), Some("1080"));
    assert_eq!(fake.count("streamdetails:"), 2);
}

#[tokio::test]
async fn duration_and_status_helpers() {
    let utils = utils(&Arc::new(Fake::default()));

    let duration = utils.get_duration("1:05");
    assert_eq!(duration.get_str("Runtime"), Some("65"));
    assert!(utils.get_duration("soon").is_empty());

    assert_eq!(utils.translate_string("continuing"), "Lopend");
    assert_eq!(utils.translate_string("Pilot"), "Pilot");
}

#[tokio::test]
async fn extrafanart_follows_the_folder() {
    let dir = tempfile::tempdir().unwrap();
    let movie = dir.path().join("Movie (2020).mkv");
    std::fs::write(&movie, b"").unwrap();
    let utils = utils(&Arc::new(Fake::default()));
    let path = movie.to_string_lossy().to_string();

    assert!(utils.get_extrafanart(&path, MediaType::Movie).await.is_empty());

    let folder = dir.path().join("extrafanart");
    std::fs::create_dir(&folder).unwrap();
    std::fs::write(folder.join("fanart1.jpg"), b"").unwrap();

    let found = utils.get_extrafanart(&path, MediaType::Movie).await;
    assert_eq!(found.get("extrafanarts").and_then(Value::as_array).map(Vec::len), Some(1));

    // folder still present: the stored entry is served
    std::fs::write(folder.join("fanart2.jpg"), b"").unwrap();
    let cached = utils.get_extrafanart(&path, MediaType::Movie).await;
    assert_eq!(cached, found);

    std::fs::remove_dir_all(&folder).unwrap();
    assert!(utils.get_extrafanart(&path, MediaType::Movie).await.is_empty());
}

#[tokio::test]
async fn close_flushes_and_consumes() {
    let utils = utils(&Arc::new(Fake::default()));
    utils.close().await;
}
