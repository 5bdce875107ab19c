//! Current drawing style: fill, stroke, image alpha, and text attributes.
//!
//! Style is read at render time, never snapshotted per shape, so a setter
//! called between building a path and rendering it affects that path.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Channels quantised to 0–255, clamping out-of-range values.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_factor(&self, factor: f32) -> Self {
        Self {
            a: self.a * factor.clamp(0.0, 1.0),
            ..*self
        }
    }
}

// ─── Paint ───────────────────────────────────────────────────────────────

/// One draw pass: either a fill or a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fill(Color),
    Stroke { color: Color, width: f64 },
}

impl Paint {
    pub fn color(&self) -> Color {
        match *self {
            Paint::Fill(color) | Paint::Stroke { color, .. } => color,
        }
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

impl FromStr for FontStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "normal" => Ok(FontStyle::Normal),
            "bold" => Ok(FontStyle::Bold),
            "italic" => Ok(FontStyle::Italic),
            "bolditalic" => Ok(FontStyle::BoldItalic),
            other => Err(Error::InvalidTextStyle(other.to_string())),
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bolditalic",
        })
    }
}

/// Text attributes. An empty family means the backend's default typeface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: String,
    pub size: f64,
    pub style: FontStyle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: String::new(),
            size: 16.0,
            style: FontStyle::Normal,
        }
    }
}

// ─── Style state ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    /// `None` disables filling.
    pub fill: Option<Color>,
    pub stroke: Color,
    /// `0` disables stroking.
    pub stroke_weight: f64,
    /// Multiplier applied to images.
    pub alpha: f32,
    pub text: TextStyle,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fill: Some(Color::rgba(0.5, 0.5, 0.5, 1.0)),
            stroke: Color::BLACK,
            stroke_weight: 1.0,
            alpha: 1.0,
            text: TextStyle::default(),
        }
    }
}

impl StyleState {
    pub fn set_fill(&mut self, color: Color) {
        self.fill = Some(color);
    }

    pub fn no_fill(&mut self) {
        self.fill = None;
    }

    pub fn set_stroke(&mut self, color: Color) {
        self.stroke = color;
    }

    pub fn set_stroke_weight(&mut self, weight: f64) {
        self.stroke_weight = weight;
    }

    pub fn no_stroke(&mut self) {
        self.stroke_weight = 0.0;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn set_text_font(&mut self, family: impl Into<String>) {
        self.text.family = family.into();
    }

    pub fn set_text_size(&mut self, size: f64) {
        self.text.size = size;
    }

    pub fn set_text_style(&mut self, style: FontStyle) {
        self.text.style = style;
    }

    pub fn fill_paint(&self) -> Option<Paint> {
        self.fill.map(Paint::Fill)
    }

    pub fn stroke_paint(&self) -> Option<Paint> {
        (self.stroke_weight > 0.0).then_some(Paint::Stroke {
            color: self.stroke,
            width: self.stroke_weight,
        })
    }

    /// Draw passes in render order: fill first, then stroke.
    pub fn passes(&self) -> impl Iterator<Item = Paint> {
        self.fill_paint().into_iter().chain(self.stroke_paint())
    }
}
