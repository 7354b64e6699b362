//! Core library for the Storyboard FX generator.
//!
//! Each effect module turns designer-facing parameters into [`Element`]s:
//! created sprites or texts carrying their time-ordered [`Command`] lists.
//! Generators are plain functions over their inputs and share only the
//! command model and the geometry primitives. Parsing of beatmaps, subtitles
//! and audio, as well as font rasterization, stays behind the adapter traits
//! each module exposes.

pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod lyrics;
pub mod particles;
pub mod spectrum;

pub use command::{Command, Element, ElementBuilder, ElementKind, Layer, Origin, Rgb, Storyboard};
pub use config::{EffectSpec, ProjectConfig, StageConfig};
pub use error::{Result, StoryboardError};
pub use geometry::{Easing, Playfield, TimeRange, Vector2};
pub use highlight::{highlight, Circle, HighlightConfig, LinearSlider, SliderPath};
pub use lyrics::{lyrics, Cue, FontMetrics, LyricsConfig, MonospaceMetrics, SubtitleParser};
pub use particles::{AngleRange, ParticleConfig, ParticleReport, SpawnDistribution};
pub use spectrum::{spectrum, SpectrumConfig, SpectrumSchema, SpectrumSeries};
