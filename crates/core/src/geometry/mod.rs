//! Vector, time and easing primitives shared by every effect generator.

use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::{Result, StoryboardError};

/// Point or offset in storyboard pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `radians`, measured clockwise from +x in
    /// screen space (y grows downward).
    pub fn from_angle(radians: f64) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    /// Linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Vector2, t: f64) -> Vector2 {
        self + (other - self) * t
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vector2) -> f64 {
        (other - self).length()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Inclusive millisecond window. `start <= end` always holds for values
/// obtained through [`TimeRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// Validates the window on behalf of `effect`.
    pub fn new(effect: &'static str, start: i64, end: i64) -> Result<Self> {
        if end < start {
            return Err(StoryboardError::InvalidTimeRange { effect, start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-instant range used by static commands.
    pub const fn at(time: i64) -> Self {
        Self {
            start: time,
            end: time,
        }
    }

    /// Re-checks the ordering invariant for ranges that arrived through
    /// deserialization.
    pub fn validated(self, effect: &'static str) -> Result<Self> {
        Self::new(effect, self.start, self.end)
    }

    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && time <= self.end
    }

    /// True when `other` lies entirely inside this window.
    pub fn encloses(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Axis-aligned, inclusive bounds of the valid stage area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub min: Vector2,
    pub max: Vector2,
}

impl Playfield {
    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

impl Default for Playfield {
    /// Widescreen storyboard area: wider than the 640x480 visible frame so
    /// sprites can be staged off-screen.
    fn default() -> Self {
        Self::new(Vector2::new(-107.0, 0.0), Vector2::new(747.0, 480.0))
    }
}

/// Storyboard easing curves, in the order of their numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    Out,
    In,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InElastic,
    OutElastic,
    OutElasticHalf,
    OutElasticQuarter,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
}

impl Easing {
    /// Numeric identifier written into storyboard scripts.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Maps linear progress in `[0, 1]` to eased progress. Back and elastic
    /// curves leave the unit interval on purpose.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Out | Self::OutQuad => out(t, |t| t * t),
            Self::In | Self::InQuad => t * t,
            Self::InOutQuad => in_out(t, |t| t * t),
            Self::InCubic => t.powi(3),
            Self::OutCubic => out(t, |t| t.powi(3)),
            Self::InOutCubic => in_out(t, |t| t.powi(3)),
            Self::InQuart => t.powi(4),
            Self::OutQuart => out(t, |t| t.powi(4)),
            Self::InOutQuart => in_out(t, |t| t.powi(4)),
            Self::InQuint => t.powi(5),
            Self::OutQuint => out(t, |t| t.powi(5)),
            Self::InOutQuint => in_out(t, |t| t.powi(5)),
            Self::InSine => sine_in(t),
            Self::OutSine => out(t, sine_in),
            Self::InOutSine => in_out(t, sine_in),
            Self::InExpo => expo_in(t),
            Self::OutExpo => out(t, expo_in),
            Self::InOutExpo => in_out(t, expo_in),
            Self::InCirc => circ_in(t),
            Self::OutCirc => out(t, circ_in),
            Self::InOutCirc => in_out(t, circ_in),
            Self::InElastic => out(t, |t| elastic_out(t, 1.0)),
            Self::OutElastic => elastic_out(t, 1.0),
            Self::OutElasticHalf => elastic_out(t, 0.5),
            Self::OutElasticQuarter => elastic_out(t, 0.25),
            Self::InOutElastic => in_out(t, |t| out(t, |t| elastic_out(t, 1.0))),
            Self::InBack => back_in(t),
            Self::OutBack => out(t, back_in),
            Self::InOutBack => in_out(t, back_in),
            Self::InBounce => out(t, bounce_out),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => in_out(t, |t| out(t, bounce_out)),
        }
    }
}

fn out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    1.0 - ease_in(1.0 - t)
}

fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 - 2.0 * t) / 2.0
    }
}

fn sine_in(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}

fn expo_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * (t - 1.0))
    }
}

fn circ_in(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn back_in(t: f64) -> f64 {
    const OVERSHOOT: f64 = 1.70158;
    t * t * ((OVERSHOOT + 1.0) * t - OVERSHOOT)
}

fn elastic_out(t: f64, period_scale: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    2f64.powf(-10.0 * t) * ((period_scale * t - 0.075) * (2.0 * PI) / 0.3).sin() + 1.0
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn time_range_rejects_reversed_window() {
        let err = TimeRange::new("spectrum", 500, 100).unwrap_err();
        assert!(matches!(
            err,
            StoryboardError::InvalidTimeRange {
                effect: "spectrum",
                start: 500,
                end: 100
            }
        ));
        assert!(TimeRange::new("spectrum", 100, 100).is_ok());
    }

    #[test]
    fn window_enclosure_is_inclusive() {
        let window = TimeRange::new("test", 0, 1000).unwrap();
        assert!(window.encloses(&TimeRange::at(0)));
        assert!(window.encloses(&TimeRange::new("test", 0, 1000).unwrap()));
        assert!(!window.encloses(&TimeRange::new("test", 500, 1001).unwrap()));
    }

    #[test]
    fn default_playfield_matches_widescreen_bounds() {
        let field = Playfield::default();
        assert!(field.contains(Vector2::new(-107.0, 0.0)));
        assert!(field.contains(Vector2::new(747.0, 480.0)));
        assert!(!field.contains(Vector2::new(747.5, 240.0)));
        assert!(!field.contains(Vector2::new(320.0, -0.1)));
    }

    #[test]
    fn vector_lerp_hits_endpoints() {
        let a = Vector2::new(10.0, 20.0);
        let b = Vector2::new(30.0, -20.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vector2::new(20.0, 0.0));
    }

    #[test]
    fn every_easing_is_anchored_at_both_ends() {
        let all: Vec<Easing> = serde_json::from_str(ALL_EASINGS).unwrap();
        assert_eq!(all.len(), Easing::InOutBounce.id() as usize + 1);
        for (id, easing) in all.into_iter().enumerate() {
            assert_eq!(easing.id() as usize, id);
            assert!(easing.apply(0.0).abs() < EPS, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{easing:?} at 1");
        }
    }

    #[test]
    fn back_easing_overshoots() {
        assert!(Easing::InBack.apply(0.2) < 0.0);
        assert!(Easing::OutBack.apply(0.8) > 1.0);
    }

    const ALL_EASINGS: &str = r#"["Linear","Out","In","InQuad","OutQuad","InOutQuad",
        "InCubic","OutCubic","InOutCubic","InQuart","OutQuart","InOutQuart",
        "InQuint","OutQuint","InOutQuint","InSine","OutSine","InOutSine",
        "InExpo","OutExpo","InOutExpo","InCirc","OutCirc","InOutCirc",
        "InElastic","OutElastic","OutElasticHalf","OutElasticQuarter","InOutElastic",
        "InBack","OutBack","InOutBack","InBounce","OutBounce","InOutBounce"]"#;
}
