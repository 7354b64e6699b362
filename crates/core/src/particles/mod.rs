//! Stochastic particle spawner with playfield culling.
//!
//! Each particle is a sprite that travels a straight line for one lifetime,
//! looped until the effect window is tiled. Particles whose path would leave
//! the playfield at any millisecond of a loop are dropped entirely.

use std::f64::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    Command, Easing, Element, ElementBuilder, Layer, Origin, Playfield, Result, Rgb,
    StageConfig, StoryboardError, TimeRange, Vector2,
};

const EFFECT: &str = "particles";

/// Direction particles travel in, in degrees clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AngleRange {
    /// `center ± spread`.
    Spread { center: f64, spread: f64 },
    /// Inclusive `[min, max]`.
    Between { min: f64, max: f64 },
}

impl AngleRange {
    /// Lower and upper bound in degrees.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Self::Spread { center, spread } => (center - spread, center + spread),
            Self::Between { min, max } => (min, max),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Spread { spread, .. } if spread < 0.0 => Err(StoryboardError::config(
                EFFECT,
                "angle",
                "spread must not be negative",
            )),
            Self::Between { min, max } if min > max => Err(StoryboardError::config(
                EFFECT,
                "angle",
                format!("min {min} exceeds max {max}"),
            )),
            _ => Ok(()),
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let (low, high) = self.bounds();
        if low < high {
            rng.gen_range(low..=high)
        } else {
            low
        }
    }
}

/// How spawn offsets are distributed around the spawn origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnDistribution {
    /// Uniform over the disk of radius `spawn_spread`.
    #[default]
    UniformDisk,
    /// Uniform in distance up to `spawn_spread`; denser near the origin.
    Radial,
}

/// Parameters of the particle effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Easing of every particle's movement.
    pub easing: Easing,
    /// Fade in and fade out duration inside each loop, in milliseconds.
    pub fade_duration: f64,
    pub count: u32,
    pub color: Rgb,
    pub scale: f64,
    /// Sprite rotation at spawn, in degrees.
    pub start_rotation: f64,
    pub opacity: f64,
    pub spawn_origin: Vector2,
    /// Maximum distance between a particle and the spawn origin.
    pub spawn_spread: f64,
    pub spawn_distribution: SpawnDistribution,
    pub angle: AngleRange,
    /// Pixels travelled per second.
    pub speed: f64,
    /// Milliseconds a particle stays alive.
    pub lifetime: f64,
    /// Turn the sprite towards its direction of travel over each loop.
    pub rotate: bool,
    /// Pins the random draws; unset means a fresh entropy seed per call.
    pub seed: Option<u64>,
    pub layer: Layer,
    pub origin: Origin,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            easing: Easing::Linear,
            fade_duration: 300.0,
            count: 20,
            color: Rgb::WHITE,
            scale: 1.0,
            start_rotation: 0.0,
            opacity: 1.0,
            spawn_origin: Vector2::new(420.0, 0.0),
            spawn_spread: 10.0,
            spawn_distribution: SpawnDistribution::UniformDisk,
            angle: AngleRange::Between {
                min: 50.0,
                max: 150.0,
            },
            speed: 480.0,
            lifetime: 1000.0,
            rotate: true,
            seed: None,
            layer: Layer::Background,
            origin: Origin::Centre,
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.lifetime.is_finite() && self.lifetime > 0.0) {
            return Err(StoryboardError::config(EFFECT, "lifetime", "must be positive"));
        }
        if !(self.fade_duration.is_finite() && self.fade_duration >= 0.0) {
            return Err(StoryboardError::config(
                EFFECT,
                "fade_duration",
                "must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StoryboardError::config(EFFECT, "opacity", "must lie in [0, 1]"));
        }
        if !(self.spawn_spread.is_finite() && self.spawn_spread >= 0.0) {
            return Err(StoryboardError::config(
                EFFECT,
                "spawn_spread",
                "must not be negative",
            ));
        }
        if !self.speed.is_finite() {
            return Err(StoryboardError::config(EFFECT, "speed", "must be finite"));
        }
        self.angle.validate()
    }

    /// Pixels covered during one lifetime.
    pub fn move_distance(&self) -> f64 {
        self.speed * self.lifetime / 1000.0
    }
}

/// Loop layout tiling the effect window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPlan {
    pub count: u32,
    /// Exact (fractional) length of one iteration in milliseconds.
    pub duration: f64,
}

impl LoopPlan {
    /// At least one loop; loops tile the window exactly, so an iteration may
    /// differ slightly from the nominal lifetime.
    pub fn new(window: TimeRange, lifetime: f64) -> Self {
        let duration = window.duration() as f64;
        let count = ((duration / lifetime).floor() as u32).max(1);
        Self {
            count,
            duration: duration / f64::from(count),
        }
    }
}

/// One particle's random draws, resolved to positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub start: Vector2,
    pub end: Vector2,
    /// Direction of travel in radians.
    pub angle: f64,
}

impl Trajectory {
    fn draw<R: Rng>(config: &ParticleConfig, rng: &mut R) -> Self {
        let spawn_angle = rng.gen_range(0.0..TAU);
        let unit: f64 = rng.gen_range(0.0..=1.0);
        let spawn_distance = match config.spawn_distribution {
            SpawnDistribution::UniformDisk => config.spawn_spread * unit.sqrt(),
            SpawnDistribution::Radial => config.spawn_spread * unit,
        };
        let angle = config.angle.sample(rng).to_radians();

        let start = config.spawn_origin + Vector2::from_angle(spawn_angle) * spawn_distance;
        let end = start + Vector2::from_angle(angle) * config.move_distance();
        Self { start, end, angle }
    }

    /// Walks the straight line at every whole millisecond of
    /// `[0, loop_duration)` and reports whether any sample leaves `playfield`.
    /// Movement easing is not applied.
    pub fn leaves(&self, playfield: &Playfield, loop_duration: f64) -> bool {
        let mut t = 0.0;
        while t < loop_duration {
            if !playfield.contains(self.start.lerp(self.end, t / loop_duration)) {
                return true;
            }
            t += 1.0;
        }
        false
    }
}

/// Elements produced by one run together with the number of rejected draws.
#[derive(Debug, Clone, Default)]
pub struct ParticleReport {
    pub elements: Vec<Element>,
    pub culled: u32,
}

/// Spawns particles using `config.seed`, or entropy when no seed is set.
pub fn generate(
    window: TimeRange,
    sprite: &str,
    stage: &StageConfig,
    config: &ParticleConfig,
) -> Result<ParticleReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with_rng(window, sprite, stage, config, &mut rng)
}

/// Spawns particles drawing from the caller's random source.
pub fn generate_with_rng<R: Rng>(
    window: TimeRange,
    sprite: &str,
    stage: &StageConfig,
    config: &ParticleConfig,
    rng: &mut R,
) -> Result<ParticleReport> {
    let window = window.validated(EFFECT)?;
    config.validate()?;

    let plan = LoopPlan::new(window, config.lifetime);
    let mut report = ParticleReport::default();

    for _ in 0..config.count {
        let trajectory = Trajectory::draw(config, rng);
        if trajectory.leaves(&stage.playfield, plan.duration) {
            report.culled += 1;
            continue;
        }
        report
            .elements
            .push(build_particle(window, sprite, config, plan, &trajectory));
    }

    tracing::debug!(
        emitted = report.elements.len(),
        culled = report.culled,
        loops = plan.count,
        "generated particles"
    );
    Ok(report)
}

fn build_particle(
    window: TimeRange,
    sprite: &str,
    config: &ParticleConfig,
    plan: LoopPlan,
    trajectory: &Trajectory,
) -> Element {
    // Floored so `count` iterations never run past the window end.
    let iteration = plan.duration.floor() as i64;
    let fade = (config.fade_duration.round() as i64).min(iteration / 2);
    let start_rotation = config.start_rotation.to_radians();

    let mut body = vec![
        Command::fade(TimeRange { start: 0, end: fade }, 0.0, config.opacity),
        Command::fade(
            TimeRange {
                start: iteration - fade,
                end: iteration,
            },
            config.opacity,
            0.0,
        ),
        Command::moving(
            TimeRange {
                start: 0,
                end: iteration,
            },
            trajectory.start,
            trajectory.end,
            config.easing,
        ),
    ];
    if config.rotate {
        body.push(Command::rotate(
            TimeRange {
                start: 0,
                end: iteration,
            },
            start_rotation,
            start_rotation + trajectory.angle,
        ));
    }
    // Body commands follow the same start-time ordering as top-level ones.
    body.sort_by_key(Command::start_time);

    let mut builder =
        ElementBuilder::sprite(sprite, config.layer, config.origin, trajectory.start);
    builder
        .push(Command::color_at(window.start, config.color))
        .push(Command::scale_at(window.start, config.scale));
    if config.start_rotation != 0.0 {
        builder.push(Command::rotate_at(window.start, start_rotation));
    }
    builder.push(Command::Loop {
        start: window.start,
        count: plan.count,
        body,
    });
    builder.build()
}
