//! Frame Overlays
//!
//! Annotation model replayed onto every captured frame:
//! - Named RGB palette
//! - Rectangle outlines and text labels
//! - Append-only registries with dense integer keys
//! - Painter rasterizing a draw list with `imageproc`

pub mod annotation;
pub mod color;
pub mod registry;
pub mod render;

pub use annotation::{
    Annotation, FontFace, LineType, Point, Rectangle, TextLabel, TextStyle, DEFAULT_THICKNESS,
};
pub use color::{Color, ColorSpec};
pub use registry::Registry;
pub use render::Painter;

use thiserror::Error;

/// Overlay error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("Unknown color name: {0}")]
    UnknownColor(String),

    #[error("Font loading failed: {0}")]
    Font(String),
}

/// The two annotation registries of a capture session
#[derive(Debug, Clone, Default)]
pub struct Overlays {
    pub rectangles: Registry<Rectangle>,
    pub texts: Registry<TextLabel>,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rectangle outline; returns its key
    pub fn add_rectangle(
        &mut self,
        top_left: impl Into<Point>,
        bottom_right: impl Into<Point>,
        color: impl Into<Color>,
        thickness: i32,
    ) -> u32 {
        self.rectangles
            .insert(Rectangle::new(top_left, bottom_right, color, thickness))
    }

    /// Register a text label; returns its key
    pub fn add_text(
        &mut self,
        text: impl Into<String>,
        anchor: impl Into<Point>,
        font_size: f32,
        color: impl Into<Color>,
        thickness: i32,
    ) -> u32 {
        self.texts
            .insert(TextLabel::new(text, anchor, font_size, color, thickness))
    }

    /// Draw list: all rectangles, then all texts, each in insertion order
    pub fn draw_list(&self) -> Vec<Annotation> {
        self.rectangles
            .values()
            .copied()
            .map(Annotation::Rectangle)
            .chain(self.texts.values().cloned().map(Annotation::Text))
            .collect()
    }
}
