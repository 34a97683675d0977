//! IMDb top 250 chart, scraped from the chart page.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use artutils_cache::SimpleCache;
use regex::Regex;
use tracing::{debug, info};

use crate::provider::ChartProvider;
use crate::{MetadataError, http};

const CHART_URL: &str = "https://www.imdb.com/chart/top/";
const CHART_CACHE_KEY: &str = "imdb.top250";
const CHART_TTL_DAYS: u32 = 7;
const BROWSER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static TITLE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/title/(tt\d+)").unwrap());

pub struct ImdbChartClient {
    chart_url: String,
    client: reqwest::Client,
    cache: Option<Arc<SimpleCache>>,
}

impl ImdbChartClient {
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            chart_url: CHART_URL.to_string(),
            client: http::build_client(timeout),
            cache: None,
        }
    }

    pub fn with_chart_url(mut self, url: impl Into<String>) -> Self {
        self.chart_url = url.into();
        self
    }

    /// Keep the whole chart in `cache` for a week.
    pub fn with_cache(mut self, cache: Arc<SimpleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn fetch_chart(&self) -> Result<HashMap<String, u32>, MetadataError> {
        let page = http::send_text(
            "imdb",
            self.client
                .get(&self.chart_url)
                .header(reqwest::header::USER_AGENT, BROWSER_AGENT)
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US"),
        )
        .await?;
        let chart = parse_chart(&page);
        info!(entries = chart.len(), "fetched IMDb top 250");
        Ok(chart)
    }
}

#[async_trait::async_trait]
impl ChartProvider for ImdbChartClient {
    async fn top250(&self) -> Result<HashMap<String, u32>, MetadataError> {
        if let Some(cache) = &self.cache {
            if let Some(chart) = cache.get(CHART_CACHE_KEY, None).await {
                debug!("IMDb chart from cache");
                return Ok(chart);
            }
        }

        let chart = self.fetch_chart().await?;
        if let Some(cache) = &self.cache {
            if !chart.is_empty() {
                cache.set(CHART_CACHE_KEY, &chart, CHART_TTL_DAYS, None).await;
            }
        }
        Ok(chart)
    }
}

/// Chart positions in page order. Each title is linked several times per
/// row, so only the first occurrence counts.
fn parse_chart(page: &str) -> HashMap<String, u32> {
    let mut chart = HashMap::new();
    for caps in TITLE_LINK.captures_iter(page) {
        let next = chart.len() as u32 + 1;
        if next > 250 {
            break;
        }
        chart.entry(caps[1].to_string()).or_insert(next);
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <li><a href="/title/tt0111161/?ref_=chttp_i_1"><img/></a>
            <a href="/title/tt0111161/?ref_=chttp_t_1">The Shawshank Redemption</a></li>
        <li><a href="/title/tt0068646/?ref_=chttp_i_2"><img/></a>
            <a href="/title/tt0068646/?ref_=chttp_t_2">The Godfather</a></li>
        <li><a href="/title/tt0468569/">The Dark Knight</a></li>
    "#;

    #[test]
    fn positions_follow_first_occurrence() {
        let chart = parse_chart(PAGE);
        assert_eq!(chart.len(), 3);
        assert_eq!(chart["tt0111161"], 1);
        assert_eq!(chart["tt0068646"], 2);
        assert_eq!(chart["tt0468569"], 3);
    }

    #[tokio::test]
    async fn chart_is_cached_for_a_week() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(SimpleCache::in_memory());
        let client = ImdbChartClient::new(std::time::Duration::from_secs(5))
            .with_chart_url(server.uri())
            .with_cache(cache);

        assert_eq!(client.top250().await.unwrap()["tt0068646"], 2);
        assert_eq!(client.top250().await.unwrap()["tt0111161"], 1);
    }
}
