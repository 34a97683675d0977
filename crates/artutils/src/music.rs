//! Artist and album artwork via MusicBrainz ids and fanart.tv.

use artutils_cache::CachePolicy;
use artutils_core::Record;
use tracing::debug;

use crate::facade::{ArtUtils, non_blank, op_key, or_empty};

impl ArtUtils {
    /// Artwork for an artist, and for one of their albums when `album` is
    /// given. Album art wins over artist art for `thumb` and `discart`.
    /// `track` and `disc` only tag the result.
    pub async fn get_music_artwork(
        &self,
        artist: &str,
        album: Option<&str>,
        track: Option<&str>,
        disc: Option<&str>,
        ignore_cache: bool,
    ) -> Record {
        let Some(artist) = non_blank(Some(artist)) else {
            return Record::new();
        };
        let (album, track, disc) = (non_blank(album), non_blank(track), non_blank(disc));
        let key = op_key("get_music_artwork", &(artist, album, track, disc));
        let policy = CachePolicy::days(14).ignore_cache(ignore_cache);

        self.cache
            .cached(&key, policy, || async {
                let mut record = Record::new();
                let mut art = Record::new();
                let mb = &self.providers.musicbrainz;
                let fanart = &self.providers.fanart;

                let artist_id = mb.artist_id(artist).await;
                let artist_id = or_empty("musicbrainz artist", artist, artist_id);
                if let Some(mbid) = &artist_id {
                    let artist_art = fanart.music_artist(mbid).await;
                    art.extend(or_empty("fanart.tv artist", mbid, artist_art), &[]);
                }
                record.insert_opt("musicbrainzartistid", artist_id);

                if let Some(album) = album {
                    let album_id = mb.album_id(artist, album).await;
                    let album_id = or_empty("musicbrainz album", album, album_id);
                    if let Some(mbid) = &album_id {
                        let album_art = fanart.music_album(mbid).await;
                        let album_art = or_empty("fanart.tv album", mbid, album_art);
                        // artist fanarts are kept; the album cover is the thumb
                        art.extend(album_art, &["thumb", "discart"]);
                    }
                    record.insert_opt("musicbrainzalbumid", album_id);
                }

                if !art.contains("thumb") {
                    let query = format!("{artist} {}", album.unwrap_or_default());
                    let found = self.providers.images.search_image(query.trim(), None).await;
                    art.insert_opt("thumb", or_empty("music thumb search", artist, found));
                }
                if album.is_some() {
                    let folder = art.get_str("thumb").map(str::to_string);
                    art.insert_opt("folder", folder);
                }

                if art.is_empty() {
                    debug!(artist, "no music artwork found");
                    return Record::new();
                }
                record.insert("art", art);
                record.insert("artist", artist);
                record.insert_opt("album", album);
                record.insert_opt("track", track);
                record.insert_opt("disc", disc);
                record
            })
            .await
    }
}
