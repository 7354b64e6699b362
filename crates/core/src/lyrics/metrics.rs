use std::path::{Path, PathBuf};

use crate::{Result, StoryboardError};

/// Text measurement provider. Widths and heights are in pixels at the
/// provider's native font size, before any layout scale is applied.
pub trait FontMetrics {
    fn line_width(&self, line: &str) -> f64;
    /// Height of the tallest glyph in `line`.
    fn line_height(&self, line: &str) -> f64;
    fn glyph_width(&self, glyph: char) -> f64;
    /// Makes a font file available under `name` and selects it.
    fn register_font(&mut self, path: &Path, name: &str) -> Result<()>;
}

/// Fixed-pitch metrics derived from a font size. Useful wherever real glyph
/// measurement is unavailable.
#[derive(Debug, Clone)]
pub struct MonospaceMetrics {
    advance: f64,
    height: f64,
    fonts: Vec<(String, PathBuf)>,
}

impl MonospaceMetrics {
    pub fn new(font_size: f64) -> Self {
        Self::with_advance(font_size * 0.6, font_size * 1.2)
    }

    pub fn with_advance(advance: f64, height: f64) -> Self {
        Self {
            advance,
            height,
            fonts: Vec::new(),
        }
    }

    /// Fonts registered so far, most recent last.
    pub fn fonts(&self) -> &[(String, PathBuf)] {
        &self.fonts
    }
}

impl FontMetrics for MonospaceMetrics {
    fn line_width(&self, line: &str) -> f64 {
        line.chars().map(|c| self.glyph_width(c)).sum()
    }

    fn line_height(&self, _line: &str) -> f64 {
        self.height
    }

    fn glyph_width(&self, _glyph: char) -> f64 {
        self.advance
    }

    fn register_font(&mut self, path: &Path, name: &str) -> Result<()> {
        if !path.is_file() {
            return Err(StoryboardError::msg(format!(
                "font `{name}` not found at `{}`",
                path.display()
            )));
        }
        self.fonts.push((name.to_string(), path.to_path_buf()));
        Ok(())
    }
}
