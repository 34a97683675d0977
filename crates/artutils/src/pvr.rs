//! Artwork and details for live TV / recording entries, which only come with a
//! broadcast title, channel, and genre.

use std::sync::LazyLock;

use artutils_cache::CachePolicy;
use artutils_core::{LookupIds, MediaType, Record};
use regex::Regex;
use tracing::debug;

use crate::facade::{ArtUtils, non_blank, op_key, or_empty};

static BRACKETED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\(\[][^\(\)\[\]]*[\)\]]\s*$").unwrap());
static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(s\d{1,2}\s?e\d{1,3}|\d{1,2}x\d{2,3}|(episode|ep\.?|aflevering|folge)\s*\d+)\b")
        .unwrap()
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Broadcast title without trailing `(…)`/`[…]` groups or episode markers.
pub fn clean_title(title: &str) -> String {
    let mut title = EPISODE_MARKER.replace_all(title, " ").into_owned();
    while let Some(m) = BRACKETED_SUFFIX.find(&title) {
        title.truncate(m.start());
    }
    let title = WHITESPACE.replace_all(&title, " ");
    title
        .trim()
        .trim_end_matches([':', '-', '|'])
        .trim()
        .to_string()
}

/// Movie or TV show as suggested by the EPG genre.
pub fn media_type_from_genre(genre: &str) -> MediaType {
    let genre = genre.to_lowercase();
    if genre.contains("movie") || genre.contains("film") {
        MediaType::Movie
    } else if ["series", "show", "serie", "episode"]
        .iter()
        .any(|g| genre.contains(g))
    {
        MediaType::TvShow
    } else {
        MediaType::Other
    }
}

impl ArtUtils {
    /// Details and artwork for a PVR entry.
    ///
    /// Starts from a TMDB lookup of the cleaned title. Entries that resolve to
    /// an IMDb id gain fanart.tv artwork and OMDb ratings. A missing thumb
    /// falls back to an image search on title and channel, and a missing
    /// channel logo to the channel logo lookup. A manual selection always
    /// replaces the stored entry.
    pub async fn get_pvr_artwork(
        &self,
        title: &str,
        channel: &str,
        genre: &str,
        manual_select: bool,
        ignore_cache: bool,
    ) -> Record {
        let title = clean_title(title);
        if title.is_empty() {
            return Record::new();
        }
        let channel = non_blank(Some(channel)).unwrap_or_default();
        let genre = genre.trim();
        let key = op_key("get_pvr_artwork", &(&title, channel));
        // a manual pick always reaches the selector
        let refresh = ignore_cache || manual_select;
        let policy = CachePolicy::days(14).ignore_cache(refresh);

        self.cache
            .cached(&key, policy, || async {
                let media_type = media_type_from_genre(genre);
                let preftype = (media_type != MediaType::Other).then_some(media_type);
                let ids = LookupIds::new().with_title(title.as_str());

                let mut record = self
                    .get_tmdb_details(&ids, media_type, manual_select, preftype, refresh)
                    .await;

                if let Some(imdb_id) = record.get_str("imdbnumber").map(str::to_string) {
                    let found_type = match record.get_str("media_type") {
                        Some("tvshow") => MediaType::TvShow,
                        _ => MediaType::Movie,
                    };
                    let tvdb_id = record.get_str("tvdb_id").map(str::to_string);
                    let extended = self
                        .get_extended_artwork(
                            Some(&imdb_id),
                            tvdb_id.as_deref(),
                            found_type,
                            refresh,
                        )
                        .await;
                    record.extend(extended, &[]);
                    let omdb = self
                        .get_omdb_info(Some(&imdb_id), None, None, found_type, refresh)
                        .await;
                    record.extend(omdb, &[]);
                }

                let mut art = record.get_record("art");
                if !art.contains("thumb") {
                    let thumb = match art.get_str("poster") {
                        Some(poster) => Some(poster.to_string()),
                        None => {
                            let query = format!("{title} {channel}");
                            let images = &self.providers.images;
                            let found = images.search_image(query.trim(), None).await;
                            or_empty("pvr thumb search", &title, found)
                        }
                    };
                    art.insert_opt("thumb", thumb);
                }
                if !art.contains("channellogo") && !channel.is_empty() {
                    let logo = self.get_channellogo(channel).await;
                    art.insert_opt("channellogo", logo.get_str("channellogo"));
                }
                record.insert_opt("art", Some(art));

                if record.is_empty() {
                    debug!(title = %title, channel, "nothing found for pvr entry");
                    return record;
                }
                record.insert("pvrtitle", title.as_str());
                record.insert("pvrchannel", channel);
                record.insert_opt("pvrgenre", non_blank(Some(genre)));
                record
            })
            .await
    }
}
