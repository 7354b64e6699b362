use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, StoryboardError, TimeRange};

/// Magnitudes of every bar at one instant, indexed by bar.
pub type SpectrumFrame = Vec<f64>;

/// Frames in time order, one per analysis step.
pub type SpectrumSeries = Vec<SpectrumFrame>;

/// Pre-analysed spectrum as written by the external analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumSchema {
    /// Analysis frames per second. Frame `k` describes time `k * 1000 / fps`.
    pub fps: f64,
    pub spectrum_frames: SpectrumSeries,
}

/// Reads a JSON schema from disk.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SpectrumSchema> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    let schema: SpectrumSchema = serde_json::from_str(&input)?;
    if !(schema.fps.is_finite() && schema.fps > 0.0) {
        return Err(StoryboardError::config(
            "spectrum",
            "fps",
            format!("schema `{}` declares fps {}", path.display(), schema.fps),
        ));
    }
    tracing::debug!(
        path = %path.display(),
        frames = schema.spectrum_frames.len(),
        "loaded spectrum schema"
    );
    Ok(schema)
}

/// Frames whose timestamp falls inside `window`, in time order.
pub fn extract_frames(schema: &SpectrumSchema, window: TimeRange) -> SpectrumSeries {
    let timestep = 1000.0 / schema.fps;
    schema
        .spectrum_frames
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let time = *index as f64 * timestep;
            time >= window.start as f64 && time <= window.end as f64
        })
        .map(|(_, frame)| frame.clone())
        .collect()
}
