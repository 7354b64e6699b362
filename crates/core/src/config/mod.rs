use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    highlight::{Circle, HighlightConfig, LinearSlider},
    lyrics::LyricsConfig,
    particles::ParticleConfig,
    spectrum::SpectrumConfig,
    Playfield, Result, TimeRange, Vector2,
};

/// Stage geometry every generator lays out against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Screen center used to anchor centered layouts.
    pub center: Vector2,
    /// Area particles must stay inside.
    pub playfield: Playfield,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            center: Vector2::new(320.0, 240.0),
            playfield: Playfield::default(),
        }
    }
}

/// Top-level project file consumed by the command line driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub stage: StageConfig,
    /// Default seed for particle effects that do not set their own.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Effects in the order their elements are emitted.
    pub effects: Vec<EffectSpec>,
}

impl ProjectConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&input)?)
    }

    /// Checks every window and effect configuration without generating.
    pub fn validate(&self) -> Result<()> {
        for effect in &self.effects {
            effect.validate()?;
        }
        Ok(())
    }
}

/// One effect invocation with its inputs. Paths are relative to the project
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectSpec {
    Highlight {
        window: TimeRange,
        sprite: String,
        #[serde(default)]
        circles: Vec<Circle>,
        #[serde(default)]
        sliders: Vec<LinearSlider>,
        #[serde(default)]
        config: HighlightConfig,
    },
    Particles {
        window: TimeRange,
        sprite: String,
        #[serde(default)]
        config: ParticleConfig,
    },
    Spectrum {
        window: TimeRange,
        sprite: String,
        schema: PathBuf,
        #[serde(default)]
        config: SpectrumConfig,
    },
    Lyrics {
        source: PathBuf,
        #[serde(default)]
        config: LyricsConfig,
    },
}

impl EffectSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Highlight { .. } => "highlight",
            Self::Particles { .. } => "particles",
            Self::Spectrum { .. } => "spectrum",
            Self::Lyrics { .. } => "lyrics",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Highlight { window, config, .. } => {
                window.validated(self.name())?;
                config.validate()
            }
            Self::Particles { window, config, .. } => {
                window.validated(self.name())?;
                config.validate()
            }
            Self::Spectrum { window, config, .. } => {
                window.validated(self.name())?;
                config.validate()
            }
            Self::Lyrics { config, .. } => config.validate(),
        }
    }
}
