//! Request helpers shared by every network client.

use std::time::Duration;

use tracing::debug;

use crate::MetadataError;

const USER_AGENT: &str = concat!("artutils/", env!("CARGO_PKG_VERSION"));

/// A `reqwest` client with the per-request timeout applied.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Send a prepared request and decode the JSON body.
pub async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, MetadataError> {
    let resp = send(provider, request).await?;
    resp.json()
        .await
        .map_err(|e| MetadataError::Provider(format!("{provider}: parse JSON: {e}")))
}

/// Send a prepared request and return the body as text.
pub async fn send_text(provider: &str, request: reqwest::RequestBuilder) -> Result<String, MetadataError> {
    let resp = send(provider, request).await?;
    resp.text()
        .await
        .map_err(|e| MetadataError::Network(format!("{provider}: read body: {e}")))
}

/// Send a prepared request and return the raw bytes.
pub async fn send_bytes(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<Vec<u8>, MetadataError> {
    let resp = send(provider, request).await?;
    resp.bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| MetadataError::Network(format!("{provider}: read body: {e}")))
}

async fn send(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, MetadataError> {
    let resp = request
        .send()
        .await
        .map_err(|e| MetadataError::Network(format!("{provider}: {e}")))?;
    debug!(provider, url = %resp.url(), status = %resp.status(), "provider response");

    match resp.status() {
        reqwest::StatusCode::NOT_FOUND => Err(MetadataError::NotFound),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Err(
            MetadataError::Auth(format!("{provider} returned {}", resp.status())),
        ),
        status if !status.is_success() => Err(MetadataError::Provider(format!(
            "{provider} returned {status}"
        ))),
        _ => Ok(resp),
    }
}

/// `"/path.jpg"` style fragments and absolute URLs both end up absolute.
pub fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
