//! Lyric layout: whole lines or individually placed characters, faded in and
//! out on each cue's boundaries.

mod metrics;
mod source;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use metrics::{FontMetrics, MonospaceMetrics};
pub use source::{load_cues, Cue, SubtitleParser};

use crate::{
    Command, Element, ElementBuilder, Layer, Origin, Result, Rgb, StageConfig, StoryboardError,
    TimeRange, Vector2,
};

const EFFECT: &str = "lyrics";

/// Font used to render lyrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub name: String,
    /// Font file to register before measuring. Unset uses the provider's
    /// default font.
    pub path: Option<PathBuf>,
    pub size: f64,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Arial".to_string(),
            path: None,
            size: 72.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// One element per character instead of one per cue.
    pub per_character: bool,
    pub fade_duration: i64,
    pub opacity: f64,
    /// Vertical position of the first line.
    pub y: f64,
    pub color: Rgb,
    /// Scale applied to the rendered text and to every measurement.
    pub font_scale: f64,
    /// Cursor advance for spaces in per-character mode.
    pub space_width: f64,
    pub font: FontSpec,
    pub layer: Layer,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            per_character: false,
            fade_duration: 300,
            opacity: 1.0,
            y: 400.0,
            color: Rgb::WHITE,
            font_scale: 1.0,
            space_width: 10.0,
            font: FontSpec::default(),
            layer: Layer::Background,
        }
    }
}

impl LyricsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fade_duration < 0 {
            return Err(StoryboardError::config(
                EFFECT,
                "fade_duration",
                "must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StoryboardError::config(EFFECT, "opacity", "must lie in [0, 1]"));
        }
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(StoryboardError::config(EFFECT, "font_scale", "must be positive"));
        }
        if self.space_width < 0.0 {
            return Err(StoryboardError::config(
                EFFECT,
                "space_width",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Lays out `cues` centered on the stage and keyframes them to their cue
/// boundaries.
pub fn lyrics<M: FontMetrics>(
    cues: &[Cue],
    metrics: &mut M,
    stage: &StageConfig,
    config: &LyricsConfig,
) -> Result<Vec<Element>> {
    config.validate()?;
    for cue in cues {
        cue.range.validated(EFFECT)?;
    }
    if let Some(path) = &config.font.path {
        metrics.register_font(path, &config.font.name)?;
    }

    let mut elements = Vec::new();
    for cue in cues {
        if cue.text.trim().is_empty() {
            tracing::trace!(start = cue.range.start, "skipping empty cue");
            continue;
        }
        if config.per_character {
            layout_characters(cue, metrics, stage.center.x, config, &mut elements);
        } else {
            let position = Vector2::new(stage.center.x, config.y);
            let builder = ElementBuilder::text(&cue.text, config.layer, Origin::Centre, position);
            elements.push(keyframe(builder, cue.range, config));
        }
    }

    tracing::debug!(
        cues = cues.len(),
        elements = elements.len(),
        per_character = config.per_character,
        "generated lyrics"
    );
    Ok(elements)
}

fn layout_characters<M: FontMetrics>(
    cue: &Cue,
    metrics: &M,
    center_x: f64,
    config: &LyricsConfig,
    elements: &mut Vec<Element>,
) {
    let scale = config.font_scale;
    let mut y = config.y;

    for line in cue.text.lines() {
        let line_height = metrics.line_height(line) * scale;
        let line_width = metrics.line_width(line) * scale;
        let mut x = center_x - line_width / 2.0;

        for glyph in line.chars() {
            if glyph == ' ' {
                x += config.space_width;
                continue;
            }
            let builder = ElementBuilder::text(
                glyph.to_string(),
                config.layer,
                Origin::CentreLeft,
                Vector2::new(x, y),
            );
            elements.push(keyframe(builder, cue.range, config));
            x += metrics.glyph_width(glyph) * scale;
        }

        y += line_height;
    }
}

/// Shared scale/color/fade sequence. Fades are shortened on cues shorter than
/// two fade durations so fade-out never starts before fade-in ends.
fn keyframe(mut builder: ElementBuilder, range: TimeRange, config: &LyricsConfig) -> Element {
    let fade = config.fade_duration.min(range.duration() / 2);
    builder
        .push(Command::scale_at(range.start, config.font_scale))
        .push(Command::color_at(range.start, config.color))
        .push(Command::fade(
            TimeRange {
                start: range.start,
                end: range.start + fade,
            },
            0.0,
            config.opacity,
        ))
        .push(Command::fade(
            TimeRange {
                start: range.end - fade,
                end: range.end,
            },
            config.opacity,
            0.0,
        ));
    builder.build()
}
