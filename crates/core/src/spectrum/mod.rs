//! Spectrum bars driven by a pre-analysed magnitude series.
//!
//! Every bar only receives a keyframe where its value changes between two
//! consecutive frames, so a steady bar costs no commands at all.

mod schema;

use serde::{Deserialize, Serialize};

pub use schema::{extract_frames, load_schema, SpectrumFrame, SpectrumSchema, SpectrumSeries};

use crate::{
    Command, Element, ElementBuilder, Layer, Origin, Result, Rgb, StageConfig, StoryboardError,
    TimeRange, Vector2,
};

const EFFECT: &str = "spectrum";

/// Bar geometry and appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Real width of the bar sprite in pixels.
    pub sprite_width: f64,
    /// Real height of the bar sprite in pixels.
    pub sprite_height: f64,
    pub bar_count: usize,
    pub bar_width: f64,
    /// Height of a bar at magnitude 1.
    pub max_bar_height: f64,
    pub gap: f64,
    pub color: Rgb,
    pub opacity: f64,
    /// Anchor of each bar sprite. Defaults to `BottomLeft`, so bars stand on
    /// `stage.center.y` and grow upward. Projects laid out for centred bars
    /// should set `Centre` explicitly.
    pub origin: Origin,
    pub layer: Layer,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            sprite_width: 1.0,
            sprite_height: 1.0,
            bar_count: 32,
            bar_width: 20.0,
            max_bar_height: 80.0,
            gap: 3.0,
            color: Rgb::WHITE,
            opacity: 1.0,
            origin: Origin::BottomLeft,
            layer: Layer::Background,
        }
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bar_count == 0 {
            return Err(StoryboardError::config(EFFECT, "bar_count", "must be at least 1"));
        }
        if self.sprite_width <= 0.0 || self.sprite_height <= 0.0 {
            return Err(StoryboardError::config(
                EFFECT,
                "sprite_size",
                "sprite dimensions must be positive",
            ));
        }
        if self.bar_width < 0.0 || self.gap < 0.0 || self.max_bar_height < 0.0 {
            return Err(StoryboardError::config(
                EFFECT,
                "bar_geometry",
                "widths, gaps and heights must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StoryboardError::config(EFFECT, "opacity", "must lie in [0, 1]"));
        }
        Ok(())
    }

    /// Left edge of the first bar so the whole block is centered on
    /// `center_x`.
    pub fn first_bar_x(&self, center_x: f64) -> f64 {
        let count = self.bar_count as f64;
        let block = self.bar_width * count + self.gap * (count - 1.0);
        center_x - block / 2.0
    }

    /// Sprite scale that renders magnitude `value`.
    pub fn scale_for(&self, value: f64) -> Vector2 {
        Vector2::new(
            self.bar_width / self.sprite_width,
            value * self.max_bar_height / self.sprite_height,
        )
    }
}

/// Builds one bar element per configured bar from `series`, sampled at
/// `fps` frames per second starting at `window.start`. Bars stand on the
/// stage center line.
pub fn spectrum(
    window: TimeRange,
    sprite: &str,
    series: &SpectrumSeries,
    fps: f64,
    stage: &StageConfig,
    config: &SpectrumConfig,
) -> Result<Vec<Element>> {
    let window = window.validated(EFFECT)?;
    config.validate()?;
    if !(fps.is_finite() && fps > 0.0) {
        return Err(StoryboardError::config(EFFECT, "fps", "must be a positive number"));
    }

    let timestep = 1000.0 / fps;
    let x0 = config.first_bar_x(stage.center.x);
    let mut elements = Vec::with_capacity(config.bar_count);
    let mut keyframes = 0usize;

    for bar in 0..config.bar_count {
        let x = x0 + bar as f64 * (config.bar_width + config.gap);
        let position = Vector2::new(x, stage.center.y);
        let mut builder = ElementBuilder::sprite(sprite, config.layer, config.origin, position);
        builder
            .push(Command::fade_at(window.start, config.opacity))
            .push(Command::color_at(window.start, config.color));

        let values: Vec<f64> = series.iter().map(|frame| bar_value(frame, bar)).collect();
        for command in compress(&values, window.start, timestep, config) {
            builder.push(command);
            keyframes += 1;
        }
        elements.push(builder.build());
    }

    tracing::debug!(
        bars = config.bar_count,
        frames = series.len(),
        keyframes,
        "generated spectrum"
    );
    Ok(elements)
}

fn bar_value(frame: &SpectrumFrame, bar: usize) -> f64 {
    frame.get(bar).copied().unwrap_or(0.0)
}

/// Emits one `ScaleVec` per value transition in `values`.
fn compress(values: &[f64], start: i64, timestep: f64, config: &SpectrumConfig) -> Vec<Command> {
    let at = |frame: usize| start + (frame as f64 * timestep).round() as i64;
    let mut commands = Vec::new();
    let Some(&first) = values.first() else {
        return commands;
    };

    let mut previous = first;
    for (index, &next) in values.iter().enumerate().skip(1) {
        if next == previous {
            continue;
        }
        commands.push(Command::scale_vec(
            TimeRange {
                start: at(index - 1),
                end: at(index),
            },
            config.scale_for(previous),
            config.scale_for(next),
        ));
        previous = next;
    }
    commands
}
