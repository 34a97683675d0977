//! Stream details (codecs, resolution, languages) read with ffprobe.

use std::path::{Path, PathBuf};

use artutils_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::LocalError;

/// Reads stream details for a local media file.
#[async_trait::async_trait]
pub trait StreamDetailsReader: Send + Sync {
    async fn read(&self, file: &Path) -> Result<Record, LocalError>;
}

/// Media information extracted via ffprobe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub container: String,
    pub duration_secs: f64,
    pub video: Option<VideoStream>,
    pub audio: Vec<AudioStream>,
    pub subtitles: Vec<SubtitleStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub aspect: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec: String,
    pub channels: u32,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleStream {
    pub language: Option<String>,
}

/// Raw `ffprobe -print_format json` output, only the parts we read.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    language: Option<String>,
}

impl MediaInfo {
    /// Flattened summary plus the per-stream `streamdetails` lists.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert_opt("container", Some(self.container.as_str()));
        if self.duration_secs > 0.0 {
            record.insert("runtime", self.duration_secs.round() as u64);
        }

        if let Some(video) = &self.video {
            record.insert_opt("videocodec", Some(video.codec.as_str()));
            record.insert_opt("videoresolution", resolution_label(video.width, video.height));
            record.insert_opt(
                "videoaspectratio",
                video.aspect.map(|a| (a * 100.0).round() / 100.0),
            );
            record.insert("videowidth", video.width);
            record.insert("videoheight", video.height);
        }
        if let Some(audio) = self.audio.first() {
            record.insert_opt("audiocodec", Some(audio.codec.as_str()));
            record.insert("audiochannels", audio.channels);
        }
        record.insert_opt(
            "audiolanguages",
            Some(languages(self.audio.iter().map(|a| &a.language))),
        );
        record.insert_opt(
            "subtitlelanguages",
            Some(languages(self.subtitles.iter().map(|s| &s.language))),
        );

        let details = json!({
            "video": self.video.iter().collect::<Vec<_>>(),
            "audio": self.audio,
            "subtitle": self.subtitles,
        });
        record.insert("streamdetails", details);
        record
    }
}

/// Distinct languages in stream order.
fn languages<'a>(langs: impl Iterator<Item = &'a Option<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for lang in langs.flatten() {
        if !out.contains(lang) {
            out.push(lang.clone());
        }
    }
    out
}

/// Front-end style resolution label: the smallest standard frame that
/// contains `width` x `height`.
fn resolution_label(width: u32, height: u32) -> Option<&'static str> {
    if width == 0 || height == 0 {
        return None;
    }
    const LABELS: &[(u32, u32, &str)] = &[
        (720, 480, "480"),
        (768, 576, "576"),
        (960, 544, "540"),
        (1280, 720, "720"),
        (1920, 1080, "1080"),
        (4096, 2160, "4K"),
    ];
    Some(
        LABELS
            .iter()
            .find(|(w, h, _)| width <= *w && height <= *h)
            .map_or("8K", |(_, _, label)| *label),
    )
}

/// "16:9" → 1.777…; falls back to width / height.
fn parse_aspect(ratio: Option<&str>, width: u32, height: u32) -> Option<f64> {
    let parsed = ratio.and_then(|r| {
        let (w, h) = r.split_once(':')?;
        let (w, h): (f64, f64) = (w.parse().ok()?, h.parse().ok()?);
        (w > 0.0 && h > 0.0).then(|| w / h)
    });
    parsed.or_else(|| (height > 0).then(|| f64::from(width) / f64::from(height)))
}

fn parse_probe_output(raw: &[u8]) -> Result<MediaInfo, LocalError> {
    let probe: ProbeOutput =
        serde_json::from_slice(raw).map_err(|e| LocalError::Probe(format!("parse JSON: {e}")))?;
    let format = probe
        .format
        .ok_or_else(|| LocalError::Probe("missing 'format'".into()))?;

    let mut info = MediaInfo {
        container: format.format_name.unwrap_or_default(),
        duration_secs: format
            .duration
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0),
        ..MediaInfo::default()
    };

    for stream in probe.streams {
        let codec = stream.codec_name.unwrap_or_default();
        let language = stream.tags.language.filter(|l| l != "und");
        match stream.codec_type.as_deref() {
            // attached cover art shows up as an mjpeg/png video stream
            Some("video") if info.video.is_none() && codec != "mjpeg" && codec != "png" => {
                let (width, height) = (stream.width.unwrap_or(0), stream.height.unwrap_or(0));
                info.video = Some(VideoStream {
                    aspect: parse_aspect(stream.display_aspect_ratio.as_deref(), width, height),
                    codec,
                    width,
                    height,
                });
            }
            Some("audio") => info.audio.push(AudioStream {
                codec,
                channels: stream.channels.unwrap_or(2),
                language,
            }),
            Some("subtitle") => info.subtitles.push(SubtitleStream { language }),
            _ => {}
        }
    }
    Ok(info)
}

/// Runs the `ffprobe` binary.
pub struct FfprobeReader {
    ffprobe_path: PathBuf,
}

impl FfprobeReader {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub async fn probe(&self, file: &Path) -> Result<MediaInfo, LocalError> {
        let output = tokio::process::Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(file)
            .output()
            .await
            .map_err(|e| LocalError::Probe(format!("spawn failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocalError::Probe(stderr.into_owned()));
        }
        debug!(file = %file.display(), "probed media file");
        parse_probe_output(&output.stdout)
    }
}

impl Default for FfprobeReader {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait::async_trait]
impl StreamDetailsReader for FfprobeReader {
    async fn read(&self, file: &Path) -> Result<Record, LocalError> {
        if !tokio::fs::try_exists(file).await? {
            return Ok(Record::new());
        }
        Ok(self.probe(file).await?.to_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "format": { "format_name": "matroska,webm", "duration": "7200.4" },
            "streams": [
                { "codec_type": "video", "codec_name": "mjpeg", "width": 600, "height": 900 },
                {
                    "codec_type": "video", "codec_name": "hevc",
                    "width": 3840, "height": 1608, "display_aspect_ratio": "160:67"
                },
                { "codec_type": "audio", "codec_name": "truehd", "channels": 8, "tags": { "language": "eng" } },
                { "codec_type": "audio", "codec_name": "ac3", "channels": 6, "tags": { "language": "ger" } },
                { "codec_type": "audio", "codec_name": "aac", "channels": 2, "tags": { "language": "eng" } },
                { "codec_type": "subtitle", "codec_name": "subrip", "tags": { "language": "und" } },
                { "codec_type": "subtitle", "codec_name": "subrip", "tags": { "language": "dut" } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn skips_cover_art_and_summarizes_streams() {
        let info = parse_probe_output(&sample()).unwrap();
        let video = info.video.as_ref().unwrap();
        assert_eq!(video.codec, "hevc");
        assert_eq!(info.audio.len(), 3);
        assert_eq!(info.subtitles[0].language, None);

        let record = info.to_record();
        assert_eq!(record.get_str("videocodec"), Some("hevc"));
        assert_eq!(record.get_str("videoresolution"), Some("4K"));
        assert_eq!(record.get("videoaspectratio"), Some(&json!(2.39)));
        assert_eq!(record.get_str("audiocodec"), Some("truehd"));
        assert_eq!(record.get("audiochannels"), Some(&json!(8)));
        assert_eq!(record.get("audiolanguages"), Some(&json!(["eng", "ger"])));
        assert_eq!(record.get("subtitlelanguages"), Some(&json!(["dut"])));
        assert_eq!(record.get("runtime"), Some(&json!(7200)));
    }

    #[test]
    fn resolution_labels() {
        assert_eq!(resolution_label(1920, 1080), Some("1080"));
        assert_eq!(resolution_label(1280, 536), Some("720"));
        assert_eq!(resolution_label(720, 576), Some("576"));
        assert_eq!(resolution_label(640, 480), Some("480"));
        assert_eq!(resolution_label(0, 0), None);
    }

    #[test]
    fn broken_output_is_a_probe_error() {
        assert!(matches!(parse_probe_output(b"not json"), Err(LocalError::Probe(_))));
        assert!(matches!(parse_probe_output(b"{}"), Err(LocalError::Probe(_))));
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FfprobeReader::new("/nonexistent/ffprobe");
        let record = reader.read(&dir.path().join("gone.mkv")).await.unwrap();
        assert!(record.is_empty());
    }
}
