//! Hit-object highlighting: circle flourishes and sampled slider trajectories.

use serde::{Deserialize, Serialize};

use crate::{
    Command, Element, ElementBuilder, Layer, Origin, Result, StoryboardError, TimeRange, Vector2,
};

const EFFECT: &str = "highlight";

/// A hit circle as reported by the beatmap geometry provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub time: i64,
    pub position: Vector2,
}

/// Slider geometry provider. Implementations must accept any `t` in
/// `[start_time, end_time]`.
pub trait SliderPath {
    fn start_time(&self) -> i64;
    fn end_time(&self) -> i64;
    fn position_at_time(&self, time: f64) -> Vector2;
}

/// Polyline slider travelled at constant speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearSlider {
    pub start_time: i64,
    pub end_time: i64,
    pub points: Vec<Vector2>,
}

impl LinearSlider {
    pub fn new(start_time: i64, end_time: i64, points: Vec<Vector2>) -> Self {
        Self {
            start_time,
            end_time,
            points,
        }
    }

    fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

impl SliderPath for LinearSlider {
    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn end_time(&self) -> i64 {
        self.end_time
    }

    fn position_at_time(&self, time: f64) -> Vector2 {
        let Some(&first) = self.points.first() else {
            return Vector2::ZERO;
        };
        let duration = (self.end_time - self.start_time) as f64;
        let total = self.length();
        if duration <= 0.0 || total <= 0.0 {
            return first;
        }

        let progress = ((time - self.start_time as f64) / duration).clamp(0.0, 1.0);
        let mut remaining = progress * total;
        for pair in self.points.windows(2) {
            let segment = pair[0].distance(pair[1]);
            if remaining <= segment {
                let t = if segment > 0.0 { remaining / segment } else { 0.0 };
                return pair[0].lerp(pair[1], t);
            }
            remaining -= segment;
        }
        self.points.last().copied().unwrap_or(first)
    }
}

/// Parameters of the highlight effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Slider samples per second.
    pub fps: f64,
    /// Length of the fade-and-shrink flourish on circles, in milliseconds.
    pub flash_duration: i64,
    pub layer: Layer,
    pub origin: Origin,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            flash_duration: 100,
            layer: Layer::Background,
            origin: Origin::Centre,
        }
    }
}

impl HighlightConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(StoryboardError::config(EFFECT, "fps", "must be a positive number"));
        }
        if self.flash_duration < 0 {
            return Err(StoryboardError::config(
                EFFECT,
                "flash_duration",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// Milliseconds between two slider samples.
    pub fn timestep(&self) -> f64 {
        1000.0 / self.fps
    }
}

/// Highlights every circle inside `window` and every slider that lies
/// entirely inside it.
pub fn highlight<S: SliderPath>(
    window: TimeRange,
    sprite: &str,
    circles: &[Circle],
    sliders: &[S],
    config: &HighlightConfig,
) -> Result<Vec<Element>> {
    let window = window.validated(EFFECT)?;
    config.validate()?;

    let mut elements = Vec::new();

    for circle in circles.iter().filter(|c| window.contains(c.time)) {
        let flash = TimeRange::new(EFFECT, circle.time, circle.time + config.flash_duration)?;
        let mut builder =
            ElementBuilder::sprite(sprite, config.layer, config.origin, circle.position);
        builder
            .push(Command::fade(flash, 1.0, 0.0))
            .push(Command::scale(flash, 0.0, 1.0));
        elements.push(builder.build());
    }
    let circle_count = elements.len();

    for slider in sliders {
        let Ok(body) = TimeRange::new(EFFECT, slider.start_time(), slider.end_time()) else {
            tracing::warn!(
                start = slider.start_time(),
                end = slider.end_time(),
                "skipping slider with reversed timing"
            );
            continue;
        };
        if !window.encloses(&body) {
            continue;
        }
        elements.push(trace_slider(slider, body, sprite, config));
    }

    tracing::debug!(
        circles = circle_count,
        sliders = elements.len() - circle_count,
        "generated hit-object highlights"
    );
    Ok(elements)
}

fn trace_slider<S: SliderPath>(
    slider: &S,
    body: TimeRange,
    sprite: &str,
    config: &HighlightConfig,
) -> Element {
    let timestep = config.timestep();
    let origin_position = slider.position_at_time(body.start as f64);
    let mut builder = ElementBuilder::sprite(sprite, config.layer, config.origin, origin_position);
    builder.push(Command::fade(body, 1.0, 0.0));

    let total_steps = (body.duration() as f64 / timestep).round() as i64;
    let boundary = |step: i64| body.start + (step as f64 * timestep).round() as i64;

    for step in 0..total_steps {
        let (from, to) = (boundary(step), boundary(step + 1));
        let segment = TimeRange { start: from, end: to };
        builder.push(Command::move_linear(
            segment,
            slider.position_at_time(from as f64),
            slider.position_at_time(to as f64),
        ));
    }

    tracing::trace!(steps = total_steps, start = body.start, "traced slider body");
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn window(start: i64, end: i64) -> TimeRange {
        TimeRange::new("test", start, end).unwrap()
    }

    fn straight(start: i64, end: i64) -> LinearSlider {
        LinearSlider::new(
            start,
            end,
            vec![Vector2::new(0.0, 0.0), Vector2::new(300.0, 0.0)],
        )
    }

    fn moves(element: &Element) -> Vec<&Command> {
        element
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Move { .. }))
            .collect()
    }

    #[test]
    fn circle_gets_fade_and_scale_flourish() {
        let circles = [Circle {
            time: 500,
            position: Vector2::new(100.0, 200.0),
        }];
        let elements = highlight::<LinearSlider>(
            window(0, 1000),
            "sb/hl.png",
            &circles,
            &[],
            &HighlightConfig::default(),
        )
        .unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].position, Vector2::new(100.0, 200.0));
        assert_eq!(
            elements[0].commands,
            vec![
                Command::fade(window(500, 600), 1.0, 0.0),
                Command::scale(window(500, 600), 0.0, 1.0),
            ]
        );
    }

    #[test]
    fn selection_is_inclusive_for_circles_and_whole_for_sliders() {
        let circles = [
            Circle { time: 0, position: Vector2::ZERO },
            Circle { time: 1000, position: Vector2::ZERO },
            Circle { time: 1001, position: Vector2::ZERO },
        ];
        let sliders = [straight(100, 900), straight(900, 1100), straight(-50, 200)];

        let elements = highlight(
            window(0, 1000),
            "sb/hl.png",
            &circles,
            &sliders,
            &HighlightConfig::default(),
        )
        .unwrap();

        // two circles and the single fully enclosed slider
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn single_frame_slider_emits_no_moves() {
        let elements = highlight(
            window(1000, 1000),
            "sb/hl.png",
            &[],
            &[straight(1000, 1000)],
            &HighlightConfig::default(),
        )
        .unwrap();

        assert_eq!(elements.len(), 1);
        assert!(moves(&elements[0]).is_empty());
    }

    #[test]
    fn slider_segments_follow_the_path() {
        let config = HighlightConfig {
            fps: 10.0,
            ..Default::default()
        };
        let elements = highlight(
            window(0, 2000),
            "sb/hl.png",
            &[],
            &[straight(0, 1000)],
            &config,
        )
        .unwrap();

        let segments = moves(&elements[0]);
        assert_eq!(segments.len(), 10);
        assert_eq!(
            *segments[0],
            Command::move_linear(window(0, 100), Vector2::new(0.0, 0.0), Vector2::new(30.0, 0.0))
        );
        assert!(elements[0].is_time_ordered());
    }

    #[test]
    fn reversed_window_fails_before_emitting() {
        let err = highlight::<LinearSlider>(
            TimeRange { start: 10, end: 0 },
            "sb/hl.png",
            &[],
            &[],
            &HighlightConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoryboardError::InvalidTimeRange { effect: "highlight", .. }));
    }

    #[test]
    fn non_positive_fps_is_rejected() {
        let config = HighlightConfig {
            fps: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn polyline_slider_walks_at_constant_speed() {
        let slider = LinearSlider::new(
            0,
            200,
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(100.0, 0.0),
                Vector2::new(100.0, 100.0),
            ],
        );
        assert_eq!(slider.position_at_time(50.0), Vector2::new(50.0, 0.0));
        assert_eq!(slider.position_at_time(150.0), Vector2::new(100.0, 50.0));
        assert_eq!(slider.position_at_time(500.0), Vector2::new(100.0, 100.0));
    }

    proptest! {
        #[test]
        fn move_count_and_endpoints_match_sampling(
            start in 0i64..10_000,
            length in 0i64..3_000,
            fps in prop::sample::select(vec![10.0, 24.0, 30.0, 60.0]),
        ) {
            let slider = LinearSlider::new(
                start,
                start + length,
                vec![
                    Vector2::new(10.0, 10.0),
                    Vector2::new(400.0, 300.0),
                    Vector2::new(50.0, 450.0),
                ],
            );
            let config = HighlightConfig { fps, ..Default::default() };
            let elements = highlight(
                window(start, start + length),
                "sb/hl.png",
                &[],
                std::slice::from_ref(&slider),
                &config,
            ).unwrap();

            let segments = moves(&elements[0]);
            let expected = (length as f64 / config.timestep()).round() as usize;
            prop_assert_eq!(segments.len(), expected);

            for command in segments {
                if let Command::Move { range, from, to, .. } = command {
                    prop_assert_eq!(*from, slider.position_at_time(range.start as f64));
                    prop_assert_eq!(*to, slider.position_at_time(range.end as f64));
                }
            }
        }
    }
}
