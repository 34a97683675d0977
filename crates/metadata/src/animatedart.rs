//! Animated posters and backgrounds from the consiliumb animated-artwork
//! database, downloaded into a local directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use artutils_cache::SimpleCache;
use artutils_core::{Candidate, Record, Selector};
use serde_json::Value;
use tracing::{debug, info};

use crate::provider::AnimatedArtProvider;
use crate::{MetadataError, http};

const INDEX_URL: &str = "https://www.consiliumb.com/animatedgifs/movies.json";
const IMAGE_BASE: &str = "https://www.consiliumb.com/animatedgifs";
const INDEX_CACHE_KEY: &str = "animatedart.index";
const INDEX_TTL_DAYS: u32 = 1;

/// (entry type in the index, output key)
const KINDS: &[(&str, &str)] = &[("poster", "animatedposter"), ("background", "animatedfanart")];

pub struct AnimatedArtClient {
    index_url: String,
    image_base: String,
    dest_dir: PathBuf,
    client: reqwest::Client,
    cache: Option<Arc<SimpleCache>>,
}

impl AnimatedArtClient {
    pub fn new(dest_dir: impl Into<PathBuf>, timeout: std::time::Duration) -> Self {
        Self {
            index_url: INDEX_URL.to_string(),
            image_base: IMAGE_BASE.to_string(),
            dest_dir: dest_dir.into(),
            client: http::build_client(timeout),
            cache: None,
        }
    }

    pub fn with_urls(mut self, index_url: impl Into<String>, image_base: impl Into<String>) -> Self {
        self.index_url = index_url.into();
        self.image_base = image_base.into();
        self
    }

    pub fn with_cache(mut self, cache: Arc<SimpleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn index(&self, ignore_cache: bool) -> Result<Value, MetadataError> {
        if let Some(cache) = &self.cache {
            if !ignore_cache {
                if let Some(index) = cache.get_value(INDEX_CACHE_KEY, None).await {
                    return Ok(index);
                }
            }
        }

        let index = http::send_json("animatedart", self.client.get(&self.index_url)).await?;
        if let Some(cache) = &self.cache {
            cache
                .set_value(INDEX_CACHE_KEY, index.clone(), INDEX_TTL_DAYS, None)
                .await;
        }
        Ok(index)
    }

    /// Download `image` to `dest` unless a previous run already did.
    async fn download(&self, image: &str, dest: &Path, overwrite: bool) -> Result<(), MetadataError> {
        if !overwrite && tokio::fs::try_exists(dest).await.unwrap_or(false) {
            debug!(path = %dest.display(), "animated artwork already downloaded");
            return Ok(());
        }
        let url = http::absolute_url(&self.image_base, image);
        let bytes = http::send_bytes("animatedart", self.client.get(&url)).await?;
        tokio::fs::create_dir_all(&self.dest_dir).await?;
        tokio::fs::write(dest, bytes).await?;
        info!(url = %url, path = %dest.display(), "downloaded animated artwork");
        Ok(())
    }
}

#[async_trait::async_trait]
impl AnimatedArtProvider for AnimatedArtClient {
    async fn animated_artwork(
        &self,
        imdb_id: &str,
        selector: Option<&dyn Selector>,
        ignore_cache: bool,
    ) -> Result<Record, MetadataError> {
        let index = self.index(ignore_cache).await?;
        let Some(movie) = find_movie(&index, imdb_id) else {
            return Ok(Record::new());
        };

        let mut record = Record::new();
        for (kind, key) in KINDS {
            let Some(image) = choose_entry(movie, kind, selector) else {
                continue;
            };
            let dest = self.dest_dir.join(format!("{imdb_id}_{kind}.gif"));
            self.download(&image, &dest, ignore_cache).await?;
            record.insert(*key, dest.to_string_lossy().into_owned());
        }
        Ok(record)
    }
}

fn find_movie<'a>(index: &'a Value, imdb_id: &str) -> Option<&'a Value> {
    index["movies"]
        .as_array()?
        .iter()
        .find(|m| m["imdbid"].as_str() == Some(imdb_id))
}

/// The first entry of `kind`, or the one the user picks.
fn choose_entry(movie: &Value, kind: &str, selector: Option<&dyn Selector>) -> Option<String> {
    let images: Vec<&str> = movie["entries"]
        .as_array()?
        .iter()
        .filter(|e| e["type"].as_str() == Some(kind))
        .filter_map(|e| e["image"].as_str())
        .collect();

    let index = match selector {
        None => 0,
        Some(selector) => {
            let candidates: Vec<Candidate> = images
                .iter()
                .map(|image| Candidate::new(*image).with_label2(Some(kind.to_string())))
                .collect();
            selector.select(&format!("Animated {kind}"), &candidates)?
        }
    };
    images.get(index).map(|image| image.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index() -> Value {
        json!({
            "movies": [{
                "imdbid": "tt0133093",
                "title": "The Matrix",
                "entries": [
                    { "type": "poster", "image": "matrix_p1.gif" },
                    { "type": "poster", "image": "matrix_p2.gif" },
                    { "type": "background", "image": "matrix_b1.gif" }
                ]
            }]
        })
    }

    struct PickSecond;
    impl Selector for PickSecond {
        fn select(&self, _heading: &str, candidates: &[Candidate]) -> Option<usize> {
            (candidates.len() > 1).then_some(1)
        }
    }

    #[test]
    fn picks_first_entry_or_selection() {
        let index = index();
        let movie = find_movie(&index, "tt0133093").unwrap();
        assert_eq!(choose_entry(movie, "poster", None).as_deref(), Some("matrix_p1.gif"));
        assert_eq!(
            choose_entry(movie, "poster", Some(&PickSecond)).as_deref(),
            Some("matrix_p2.gif")
        );
        assert_eq!(choose_entry(movie, "background", Some(&PickSecond)), None);
        assert!(find_movie(&index, "tt0000001").is_none());
    }

    #[tokio::test]
    async fn downloads_into_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gifs/matrix_p1.gif"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gifs/matrix_b1.gif"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = AnimatedArtClient::new(dir.path(), std::time::Duration::from_secs(5))
            .with_urls(format!("{}/movies.json", server.uri()), format!("{}/gifs", server.uri()))
            .with_cache(Arc::new(SimpleCache::in_memory()));

        let record = client.animated_artwork("tt0133093", None, false).await.unwrap();
        let poster = record.get_str("animatedposter").unwrap();
        assert!(poster.ends_with("tt0133093_poster.gif"));
        assert!(Path::new(poster).exists());
        assert!(record.get_str("animatedfanart").unwrap().ends_with("tt0133093_background.gif"));

        // index cached, files already on disk: no further requests
        let again = client.animated_artwork("tt0133093", None, false).await.unwrap();
        assert_eq!(again, record);
    }
}
