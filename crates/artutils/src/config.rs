//! Runtime configuration, read from `ARTUTILS_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ArtUtilsConfig {
    pub cache_db: PathBuf,
    pub tmdb_key: Option<String>,
    pub fanarttv_key: Option<String>,
    pub tvdb_key: Option<String>,
    pub omdb_key: Option<String>,
    /// Preferred metadata and artwork language (ISO 639-1).
    pub language: String,
    pub studio_logos_path: Option<PathBuf>,
    pub channel_logos_path: Option<PathBuf>,
    /// Where downloaded animated artwork is stored.
    pub animated_art_dir: PathBuf,
    pub ffprobe_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ArtUtilsConfig {
    fn default() -> Self {
        let cache_dir = default_cache_dir();
        Self {
            cache_db: cache_dir.join("simplecache.db"),
            tmdb_key: None,
            fanarttv_key: None,
            tvdb_key: None,
            omdb_key: None,
            language: "en".to_string(),
            studio_logos_path: None,
            channel_logos_path: None,
            animated_art_dir: cache_dir.join("animatedart"),
            ffprobe_path: PathBuf::from("ffprobe"),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl ArtUtilsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            })
        };
        let defaults = Self::default();

        Self {
            cache_db: var("ARTUTILS_CACHE_DB").map_or(defaults.cache_db, PathBuf::from),
            tmdb_key: var("ARTUTILS_TMDB_KEY"),
            fanarttv_key: var("ARTUTILS_FANARTTV_KEY"),
            tvdb_key: var("ARTUTILS_TVDB_KEY"),
            omdb_key: var("ARTUTILS_OMDB_KEY"),
            language: var("ARTUTILS_LANGUAGE").unwrap_or(defaults.language),
            studio_logos_path: var("ARTUTILS_STUDIO_LOGOS").map(PathBuf::from),
            channel_logos_path: var("ARTUTILS_CHANNEL_LOGOS").map(PathBuf::from),
            animated_art_dir: var("ARTUTILS_ANIMATED_DIR")
                .map_or(defaults.animated_art_dir, PathBuf::from),
            ffprobe_path: var("ARTUTILS_FFPROBE").map_or(defaults.ffprobe_path, PathBuf::from),
            request_timeout: var("ARTUTILS_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".cache").join("artutils"))
        .unwrap_or_else(|| PathBuf::from("."))
}
