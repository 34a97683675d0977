use serde::{Deserialize, Serialize};

/// Media type tag attached to a lookup request.
///
/// The front-end passes loose content strings (`"movies"`, `"tvshow"`,
/// `"episodes"`, ...); [`MediaType::parse`] folds them into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    MovieSet,
    TvShow,
    Season,
    Episode,
    Pvr,
    Music,
    Other,
}

impl MediaType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Self::Movie,
            "set" | "sets" | "setmovies" | "movieset" => Self::MovieSet,
            "tvshow" | "tvshows" => Self::TvShow,
            "season" | "seasons" => Self::Season,
            "episode" | "episodes" => Self::Episode,
            "pvr" | "tvchannels" | "tvrecordings" => Self::Pvr,
            "music" | "artists" | "albums" | "songs" => Self::Music,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::MovieSet => "setmovies",
            Self::TvShow => "tvshow",
            Self::Season => "season",
            Self::Episode => "episode",
            Self::Pvr => "pvr",
            Self::Music => "music",
            Self::Other => "other",
        }
    }

    /// Movies and the movies inside a set.
    pub fn is_movie(self) -> bool {
        matches!(self, Self::Movie | Self::MovieSet)
    }

    /// Anything that belongs to a TV series: the show, its seasons, its episodes.
    pub fn is_tv(self) -> bool {
        matches!(self, Self::TvShow | Self::Season | Self::Episode)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External id namespaces understood by the movie database's find endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalSource {
    Imdb,
    Tvdb,
}

impl ExternalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imdb => "imdb_id",
            Self::Tvdb => "tvdb_id",
        }
    }
}

impl std::fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifiers a lookup may be keyed by.
///
/// Blank strings are treated as absent; use the accessors rather than the raw
/// fields when deciding which branch of a fallback chain applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupIds {
    pub imdb_id: Option<String>,
    pub tvdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

impl LookupIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imdb_id(mut self, id: impl Into<String>) -> Self {
        self.imdb_id = Some(id.into());
        self
    }

    pub fn with_tvdb_id(mut self, id: impl Into<String>) -> Self {
        self.tvdb_id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn imdb_id(&self) -> Option<&str> {
        non_blank(self.imdb_id.as_deref())
    }

    pub fn tvdb_id(&self) -> Option<&str> {
        non_blank(self.tvdb_id.as_deref())
    }

    /// The title with any `" (…"` suffix (usually an appended year) removed.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref().map(strip_title_suffix))
    }

    pub fn is_empty(&self) -> bool {
        self.imdb_id().is_none() && self.tvdb_id().is_none() && self.title().is_none()
    }

    /// Copy with blanks folded to `None` and the title suffix stripped, so
    /// equivalent requests derive the same cache key.
    pub fn normalized(&self) -> Self {
        Self {
            imdb_id: self.imdb_id().map(str::to_string),
            tvdb_id: self.tvdb_id().map(str::to_string),
            title: self.title().map(str::to_string),
            year: self.year,
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn strip_title_suffix(title: &str) -> &str {
    title.split(" (").next().unwrap_or(title)
}

/// True when `id` looks like an IMDb title id (`tt0000000`).
pub fn is_imdb_id(id: &str) -> bool {
    id.trim().starts_with("tt")
}
