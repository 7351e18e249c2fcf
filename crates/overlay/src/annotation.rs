//! Annotation descriptors

use serde::{Deserialize, Serialize};

use crate::Color;

/// Default outline / stroke thickness in pixels
pub const DEFAULT_THICKNESS: i32 = 2;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned rectangle outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub top_left: Point,
    pub bottom_right: Point,
    pub color: Color,
    /// Outline thickness; zero or negative fills the rectangle
    pub thickness: i32,
}

impl Rectangle {
    pub fn new(
        top_left: impl Into<Point>,
        bottom_right: impl Into<Point>,
        color: impl Into<Color>,
        thickness: i32,
    ) -> Self {
        Self {
            top_left: top_left.into(),
            bottom_right: bottom_right.into(),
            color: color.into(),
            thickness,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.thickness <= 0
    }
}

/// Font face used for every text annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFace {
    /// Normal-size sans-serif, 22 px tall at font size 1.0
    #[default]
    Simplex,
}

impl FontFace {
    /// Glyph height in pixels at font size 1.0
    pub fn base_height(self) -> f32 {
        match self {
            FontFace::Simplex => 22.0,
        }
    }
}

/// Edge rendering mode for text strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineType {
    #[default]
    AntiAliased,
}

/// Fixed rendering style applied to all text annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub face: FontFace,
    pub line: LineType,
}

/// Text label anchored at its baseline-left point
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub anchor: Point,
    /// Scale relative to the face's base height
    pub font_size: f32,
    pub color: Color,
    pub thickness: i32,
    pub style: TextStyle,
}

impl TextLabel {
    pub fn new(
        text: impl Into<String>,
        anchor: impl Into<Point>,
        font_size: f32,
        color: impl Into<Color>,
        thickness: i32,
    ) -> Self {
        Self {
            text: text.into(),
            anchor: anchor.into(),
            font_size,
            color: color.into(),
            thickness,
            style: TextStyle::default(),
        }
    }

    /// Rendered glyph height in pixels
    pub fn pixel_height(&self) -> f32 {
        self.font_size * self.style.face.base_height()
    }
}

/// One entry of a per-frame draw list
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Rectangle(Rectangle),
    Text(TextLabel),
}

impl Annotation {
    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Annotation::Text(label) => Some(label),
            Annotation::Rectangle(_) => None,
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Annotation::Rectangle(rect) => Some(rect),
            Annotation::Text(_) => None,
        }
    }
}

impl From<Rectangle> for Annotation {
    fn from(r: Rectangle) -> Self {
        Annotation::Rectangle(r)
    }
}

impl From<TextLabel> for Annotation {
    fn from(t: TextLabel) -> Self {
        Annotation::Text(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_height_scales_base() {
        let label = TextLabel::new("hi", (0, 0), 0.5, Color::BLACK, 1);
        assert!((label.pixel_height() - 11.0).abs() < f32::EPSILON);
        assert_eq!(label.style, TextStyle::default());
    }

    #[test]
    fn test_filled_rectangle() {
        assert!(Rectangle::new((0, 0), (5, 5), Color::RED, -1).is_filled());
        assert!(!Rectangle::new((0, 0), (5, 5), Color::RED, DEFAULT_THICKNESS).is_filled());
    }
}
