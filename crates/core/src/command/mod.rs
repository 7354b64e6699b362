//! Command emission contract shared by all generators.
//!
//! Generators never talk to a scene backend directly. Each created visual is
//! returned as an [`Element`] carrying its ordered [`Command`] list, and a
//! [`Storyboard`] collects elements from several effects in call order.

use serde::{Deserialize, Serialize};

use crate::{Easing, TimeRange, Vector2};

/// Storyboard layer a visual is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layer {
    #[default]
    Background,
    Fail,
    Pass,
    Foreground,
    Overlay,
}

/// Anchor point of a visual relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Origin {
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    #[default]
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One timed animation instruction. A `None` start value together with an
/// instant range encodes a static assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Fade {
        range: TimeRange,
        from: Option<f64>,
        to: f64,
    },
    Scale {
        range: TimeRange,
        from: Option<f64>,
        to: f64,
    },
    ScaleVec {
        range: TimeRange,
        from: Option<Vector2>,
        to: Vector2,
    },
    Move {
        range: TimeRange,
        from: Vector2,
        to: Vector2,
        easing: Easing,
    },
    Rotate {
        range: TimeRange,
        from: Option<f64>,
        to: f64,
    },
    Color {
        range: TimeRange,
        from: Option<Rgb>,
        to: Rgb,
    },
    /// Repeats `body` `count` times starting at `start`. Body times are
    /// relative to the start of each iteration.
    Loop {
        start: i64,
        count: u32,
        body: Vec<Command>,
    },
}

impl Command {
    pub fn fade(range: TimeRange, from: f64, to: f64) -> Self {
        Self::Fade {
            range,
            from: Some(from),
            to,
        }
    }

    pub fn fade_at(time: i64, value: f64) -> Self {
        Self::Fade {
            range: TimeRange::at(time),
            from: None,
            to: value,
        }
    }

    pub fn scale(range: TimeRange, from: f64, to: f64) -> Self {
        Self::Scale {
            range,
            from: Some(from),
            to,
        }
    }

    pub fn scale_at(time: i64, value: f64) -> Self {
        Self::Scale {
            range: TimeRange::at(time),
            from: None,
            to: value,
        }
    }

    pub fn scale_vec(range: TimeRange, from: Vector2, to: Vector2) -> Self {
        Self::ScaleVec {
            range,
            from: Some(from),
            to,
        }
    }

    pub fn move_linear(range: TimeRange, from: Vector2, to: Vector2) -> Self {
        Self::moving(range, from, to, Easing::Linear)
    }

    pub fn moving(range: TimeRange, from: Vector2, to: Vector2, easing: Easing) -> Self {
        Self::Move {
            range,
            from,
            to,
            easing,
        }
    }

    pub fn rotate(range: TimeRange, from: f64, to: f64) -> Self {
        Self::Rotate {
            range,
            from: Some(from),
            to,
        }
    }

    pub fn rotate_at(time: i64, radians: f64) -> Self {
        Self::Rotate {
            range: TimeRange::at(time),
            from: None,
            to: radians,
        }
    }

    pub fn color_at(time: i64, color: Rgb) -> Self {
        Self::Color {
            range: TimeRange::at(time),
            from: None,
            to: color,
        }
    }

    /// Time at which the command first takes effect.
    pub fn start_time(&self) -> i64 {
        match self {
            Self::Fade { range, .. }
            | Self::Scale { range, .. }
            | Self::ScaleVec { range, .. }
            | Self::Move { range, .. }
            | Self::Rotate { range, .. }
            | Self::Color { range, .. } => range.start,
            Self::Loop { start, .. } => *start,
        }
    }

    /// Time at which the command stops changing its property. Loops end
    /// after their last iteration.
    pub fn end_time(&self) -> i64 {
        match self {
            Self::Fade { range, .. }
            | Self::Scale { range, .. }
            | Self::ScaleVec { range, .. }
            | Self::Move { range, .. }
            | Self::Rotate { range, .. }
            | Self::Color { range, .. } => range.end,
            Self::Loop { start, count, body } => {
                let iteration = body.iter().map(Command::end_time).max().unwrap_or(0);
                start + iteration * i64::from(*count)
            }
        }
    }
}

/// What a created visual displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Sprite { path: String },
    Text { text: String },
}

/// A created visual together with every command addressed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub layer: Layer,
    pub origin: Origin,
    pub position: Vector2,
    pub commands: Vec<Command>,
}

impl Element {
    /// True when commands are in non-decreasing start-time order, which is
    /// the only ordering the emission contract guarantees.
    pub fn is_time_ordered(&self) -> bool {
        self.commands
            .windows(2)
            .all(|pair| pair[0].start_time() <= pair[1].start_time())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { text } => Some(text),
            ElementKind::Sprite { .. } => None,
        }
    }
}

/// Accumulates commands for one element in emission order.
#[derive(Debug)]
pub struct ElementBuilder {
    element: Element,
}

impl ElementBuilder {
    pub fn sprite(
        path: impl Into<String>,
        layer: Layer,
        origin: Origin,
        position: Vector2,
    ) -> Self {
        Self::new(ElementKind::Sprite { path: path.into() }, layer, origin, position)
    }

    pub fn text(text: impl Into<String>, layer: Layer, origin: Origin, position: Vector2) -> Self {
        Self::new(ElementKind::Text { text: text.into() }, layer, origin, position)
    }

    fn new(kind: ElementKind, layer: Layer, origin: Origin, position: Vector2) -> Self {
        Self {
            element: Element {
                kind,
                layer,
                origin,
                position,
                commands: Vec::new(),
            },
        }
    }

    pub fn push(&mut self, command: Command) -> &mut Self {
        debug_assert!(
            self.element
                .commands
                .last()
                .map_or(true, |last| last.start_time() <= command.start_time()),
            "commands must be appended in time order"
        );
        self.element.commands.push(command);
        self
    }

    pub fn build(self) -> Element {
        self.element
    }
}

/// Append-only sink that concatenates the output of several effects.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Storyboard {
    elements: Vec<Element>,
}

impl Storyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }

    /// Moves every element of `other` to the end of this storyboard.
    pub fn append(&mut self, other: &mut Storyboard) {
        self.elements.append(&mut other.elements);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total number of top-level commands across every element.
    pub fn command_count(&self) -> usize {
        self.elements.iter().map(|e| e.commands.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: i64, end: i64) -> TimeRange {
        TimeRange::new("test", start, end).unwrap()
    }

    #[test]
    fn builder_keeps_emission_order() {
        let mut builder =
            ElementBuilder::sprite("sb/dot.png", Layer::Background, Origin::Centre, Vector2::ZERO);
        builder
            .push(Command::fade_at(0, 1.0))
            .push(Command::scale(range(0, 100), 0.0, 1.0))
            .push(Command::move_linear(
                range(100, 200),
                Vector2::ZERO,
                Vector2::new(1.0, 1.0),
            ));
        let element = builder.build();

        assert_eq!(element.commands.len(), 3);
        assert!(element.is_time_ordered());
        assert_eq!(element.text(), None);
    }

    #[test]
    fn loop_end_time_covers_every_iteration() {
        let looped = Command::Loop {
            start: 1000,
            count: 3,
            body: vec![
                Command::fade(range(0, 100), 0.0, 1.0),
                Command::fade(range(400, 500), 1.0, 0.0),
            ],
        };
        assert_eq!(looped.start_time(), 1000);
        assert_eq!(looped.end_time(), 2500);
    }

    #[test]
    fn storyboard_concatenates_in_call_order() {
        let first =
            ElementBuilder::text("a", Layer::Foreground, Origin::Centre, Vector2::ZERO).build();
        let second =
            ElementBuilder::text("b", Layer::Foreground, Origin::Centre, Vector2::ZERO).build();

        let mut other = Storyboard::new();
        other.extend([second]);

        let mut storyboard = Storyboard::new();
        storyboard.extend([first]);
        storyboard.append(&mut other);

        let texts: Vec<_> = storyboard.elements().iter().filter_map(Element::text).collect();
        assert_eq!(texts, ["a", "b"]);
        assert!(other.is_empty());
    }

    #[test]
    fn commands_serialize_with_type_tag() {
        let json = serde_json::to_value(Command::color_at(10, Rgb::new(1, 2, 3))).unwrap();
        assert_eq!(json["type"], "color");
        assert_eq!(json["range"]["start"], 10);
        assert!(json["from"].is_null());
    }
}
