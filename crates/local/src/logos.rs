//! Logo lookup in a local folder of images named after studios or channels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::is_image;

#[derive(Debug, Clone, Default)]
pub struct LogoResolver {
    dir: Option<PathBuf>,
}

impl LogoResolver {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Path of the logo whose file stem matches `name`, ignoring case,
    /// punctuation, and whitespace.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let dir = self.dir.as_deref()?;
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        let found = logos_by_name(dir).remove(&wanted);
        debug!(name, found = found.is_some(), "logo lookup");
        found.map(|p| p.to_string_lossy().into_owned())
    }

    /// Multi-studio strings (`"A / B"`) resolve to the first studio that has
    /// a logo.
    pub fn resolve_studio(&self, studio: &str) -> Option<String> {
        studio
            .split(" / ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .find_map(|s| self.resolve(s))
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn logos_by_name(dir: &Path) -> HashMap<String, PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return HashMap::new();
    };
    let mut by_name = HashMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            // first file per name wins
            by_name.entry(normalize_name(stem)).or_insert(path);
        }
    }
    by_name
}
