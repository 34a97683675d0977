//! `extrafanart` folders stored next to the media.

use std::path::{Path, PathBuf};

use artutils_core::{MediaType, Record};
use tracing::debug;

use crate::{LocalError, is_image};

const FOLDER_NAME: &str = "extrafanart";

/// Disc-structure folders; the movie folder is one level above them.
const DISC_FOLDERS: &[&str] = &["VIDEO_TS", "BDMV"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraFanartResolver;

impl ExtraFanartResolver {
    pub fn new() -> Self {
        Self
    }

    /// Candidate `extrafanart` folders for `file_path`, nearest first.
    ///
    /// Movies look beside the file (above any `VIDEO_TS`/`BDMV` folder), a
    /// show path is the show folder itself, and seasons and episodes try
    /// their own folder before the show folder above it.
    pub fn candidates(&self, file_path: &str, media_type: MediaType) -> Vec<PathBuf> {
        let path = Path::new(first_stacked_part(file_path));
        let folders: Vec<&Path> = match media_type {
            MediaType::TvShow => vec![path],
            MediaType::Season => [Some(path), path.parent()].into_iter().flatten().collect(),
            MediaType::Episode => {
                let season = path.parent();
                [season, season.and_then(Path::parent)]
                    .into_iter()
                    .flatten()
                    .collect()
            }
            _ => movie_folder(path).into_iter().collect(),
        };
        folders
            .into_iter()
            .filter(|f| !f.as_os_str().is_empty())
            .map(|f| f.join(FOLDER_NAME))
            .collect()
    }

    /// The first candidate folder that exists.
    pub async fn locate(&self, file_path: &str, media_type: MediaType) -> Option<PathBuf> {
        for dir in self.candidates(file_path, media_type) {
            if tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
                return Some(dir);
            }
        }
        None
    }

    /// `{art: {extrafanart}, extrafanarts: [...]}`, or an empty record when no
    /// folder exists.
    pub async fn resolve(&self, file_path: &str, media_type: MediaType) -> Result<Record, LocalError> {
        let Some(dir) = self.locate(file_path, media_type).await else {
            debug!(file_path, "no extrafanart folder");
            return Ok(Record::new());
        };

        let mut images = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image(&path) {
                images.push(path.to_string_lossy().into_owned());
            }
        }
        if images.is_empty() {
            return Ok(Record::new());
        }
        images.sort();

        let mut art = Record::new();
        art.insert("extrafanart", dir.to_string_lossy().into_owned());
        let mut record = Record::new();
        record.insert("art", art);
        record.insert("extrafanarts", images);
        Ok(record)
    }
}

/// `stack://a.avi , b.avi` names several parts; the first part decides.
fn first_stacked_part(file_path: &str) -> &str {
    match file_path.strip_prefix("stack://") {
        Some(rest) => rest.split(" , ").next().unwrap_or(rest),
        None => file_path,
    }
}

fn movie_folder(file: &Path) -> Option<&Path> {
    let parent = file.parent()?;
    let is_disc_folder = parent
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| DISC_FOLDERS.iter().any(|d| d.eq_ignore_ascii_case(n)));
    if is_disc_folder { parent.parent() } else { Some(parent) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_candidates_skip_disc_folders() {
        let resolver = ExtraFanartResolver::new();
        assert_eq!(
            resolver.candidates("/movies/Alien (1979)/Alien.mkv", MediaType::Movie),
            vec![PathBuf::from("/movies/Alien (1979)/extrafanart")]
        );
        assert_eq!(
            resolver.candidates("/movies/Alien/VIDEO_TS/VIDEO_TS.IFO", MediaType::Movie),
            vec![PathBuf::from("/movies/Alien/extrafanart")]
        );
        assert_eq!(
            resolver.candidates("stack:///m/Heat/cd1.avi , /m/Heat/cd2.avi", MediaType::Movie),
            vec![PathBuf::from("/m/Heat/extrafanart")]
        );
    }

    #[test]
    fn episode_candidates_walk_up_to_show() {
        let resolver = ExtraFanartResolver::new();
        assert_eq!(
            resolver.candidates("/tv/Lost/Season 1/Lost.S01E01.mkv", MediaType::Episode),
            vec![
                PathBuf::from("/tv/Lost/Season 1/extrafanart"),
                PathBuf::from("/tv/Lost/extrafanart"),
            ]
        );
        assert_eq!(
            resolver.candidates("/tv/Lost", MediaType::TvShow),
            vec![PathBuf::from("/tv/Lost/extrafanart")]
        );
    }

    #[tokio::test]
    async fn resolve_lists_images() {
        let dir = tempfile::tempdir().unwrap();
        let show = dir.path().join("Lost");
        let season = show.join("Season 1");
        let fanart = show.join("extrafanart");
        std::fs::create_dir_all(&season).unwrap();
        std::fs::create_dir_all(&fanart).unwrap();
        std::fs::write(fanart.join("b.jpg"), b"x").unwrap();
        std::fs::write(fanart.join("a.png"), b"x").unwrap();
        std::fs::write(fanart.join("notes.txt"), b"x").unwrap();

        let episode = season.join("Lost.S01E01.mkv");
        let record = ExtraFanartResolver::new()
            .resolve(episode.to_str().unwrap(), MediaType::Episode)
            .await
            .unwrap();

        assert_eq!(
            record.get_record("art").get_str("extrafanart"),
            Some(fanart.to_str().unwrap())
        );
        let files = record.get("extrafanarts").unwrap().as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].as_str().unwrap().ends_with("a.png"));
    }

    #[tokio::test]
    async fn missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        let record = ExtraFanartResolver::new()
            .resolve(movie.to_str().unwrap(), MediaType::Movie)
            .await
            .unwrap();
        assert!(record.is_empty());
    }
}
