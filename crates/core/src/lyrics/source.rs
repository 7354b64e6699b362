use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, StoryboardError, TimeRange};

/// One timed line of lyrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub text: String,
    pub range: TimeRange,
}

impl Cue {
    pub fn new(text: impl Into<String>, start: i64, end: i64) -> Result<Self> {
        Ok(Self {
            text: text.into(),
            range: TimeRange::new("lyrics", start, end)?,
        })
    }
}

/// Parser for subtitle formats (`.srt`, `.vtt`). Cue timing is in
/// milliseconds.
pub trait SubtitleParser {
    fn parse(&self, input: &str) -> Result<Vec<Cue>>;
}

/// Entry shape of pre-structured JSON lyric files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LyricEntry {
    text: String,
    start_time: i64,
    end_time: i64,
}

/// Loads cues from `path`, dispatching on the file extension.
pub fn load_cues(
    path: impl AsRef<Path>,
    subtitles: Option<&dyn SubtitleParser>,
) -> Result<Vec<Cue>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let cues = match extension.as_deref() {
        Some("srt" | "vtt") => {
            let parser = subtitles.ok_or_else(|| {
                StoryboardError::msg(format!(
                    "no subtitle parser available to read `{}`",
                    path.display()
                ))
            })?;
            let input = std::fs::read_to_string(path)?;
            let cues = parser.parse(&input)?;
            for cue in &cues {
                cue.range.validated("lyrics")?;
            }
            cues
        }
        Some("json") => {
            let input = std::fs::read_to_string(path)?;
            let entries: Vec<LyricEntry> = serde_json::from_str(&input)?;
            entries
                .into_iter()
                .map(|entry| Cue::new(entry.text, entry.start_time, entry.end_time))
                .collect::<Result<Vec<_>>>()?
        }
        _ => {
            return Err(StoryboardError::UnsupportedFormat {
                path: path.display().to_string(),
            })
        }
    };

    tracing::debug!(path = %path.display(), cues = cues.len(), "loaded lyrics");
    Ok(cues)
}
