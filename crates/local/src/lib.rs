#![allow(clippy::collapsible_if)]
pub mod extrafanart;
pub mod logos;
pub mod streamdetails;

use thiserror::Error;

pub use extrafanart::ExtraFanartResolver;
pub use logos::LogoResolver;
pub use streamdetails::{FfprobeReader, MediaInfo, StreamDetailsReader};

#[derive(Error, Debug)]
pub enum LocalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffprobe failed: {0}")]
    Probe(String),
}

/// File extensions treated as artwork.
pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub(crate) fn is_image(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}
