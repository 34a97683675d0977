#![allow(clippy::type_complexity)]
pub mod animatedart;
pub mod fanarttv;
pub mod google;
pub mod http;
pub mod imdb;
pub mod matching;
pub mod musicbrainz;
pub mod omdb;
pub mod provider;
pub mod tmdb;
pub mod tvdb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credentials and options shared by the network clients.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: String,
    pub language: String,
    pub timeout: std::time::Duration,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: "en".to_string(),
            timeout: std::time::Duration::from_secs(20),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
