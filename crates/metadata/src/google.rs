//! Image search by scraping the Google Images result page.

use std::sync::{Arc, LazyLock};

use artutils_cache::{SimpleCache, cache_key};
use regex::Regex;
use tracing::debug;

use crate::provider::ImageSearchProvider;
use crate::{MetadataError, http};

const SEARCH_URL: &str = "https://www.google.com/search";
const RESULTS_TTL_DAYS: u32 = 30;
const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static IMGURL_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"imgurl=([^&"]+)"#).unwrap());
static INLINE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\["(https?://[^"\s]+?\.(?:jpg|jpeg|png))",\d+,\d+\]"#).unwrap()
});

pub struct GoogleImagesClient {
    search_url: String,
    client: reqwest::Client,
    cache: Option<Arc<SimpleCache>>,
}

impl GoogleImagesClient {
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            client: http::build_client(timeout),
            cache: None,
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_cache(mut self, cache: Arc<SimpleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn fetch(&self, query: &str) -> Result<Vec<String>, MetadataError> {
        let page = http::send_text(
            "google",
            self.client
                .get(&self.search_url)
                .header(reqwest::header::USER_AGENT, BROWSER_AGENT)
                .query(&[
                    ("site", "imghp"),
                    ("tbm", "isch"),
                    ("tbs", "isz:l"),
                    ("q", query),
                ]),
        )
        .await?;
        let images = parse_results(&page);
        debug!(query, hits = images.len(), "google image search");
        Ok(images)
    }
}

#[async_trait::async_trait]
impl ImageSearchProvider for GoogleImagesClient {
    async fn search_images(&self, query: &str) -> Result<Vec<String>, MetadataError> {
        let Some(cache) = &self.cache else {
            return self.fetch(query).await;
        };

        let key = cache_key("google.search_images", query);
        if let Some(hit) = cache.get::<Vec<String>>(&key, None).await {
            return Ok(hit);
        }
        let images = self.fetch(query).await?;
        if !images.is_empty() {
            cache.set(&key, &images, RESULTS_TTL_DAYS, None).await;
        }
        Ok(images)
    }
}

/// Full-size image URLs in page order, deduplicated.
fn parse_results(page: &str) -> Vec<String> {
    let linked = IMGURL_PARAM.captures_iter(page).map(|c| c[1].to_string());
    let inline = INLINE_IMAGE.captures_iter(page).map(|c| c[1].to_string());

    let mut images: Vec<String> = Vec::new();
    for url in linked.chain(inline) {
        let url = url.replace(' ', "%20");
        if !images.contains(&url) {
            images.push(url);
        }
    }
    images
}
