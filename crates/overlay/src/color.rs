//! RGB colors and the named palette

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::OverlayError;

/// Three-channel 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up a palette color by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Color> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|&(_, c)| c)
    }

    /// The named palette, in a fixed order
    pub fn palette() -> &'static [(&'static str, Color)] {
        PALETTE
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

const PALETTE: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("green", Color::GREEN),
    ("red", Color::RED),
    ("blue", Color::BLUE),
    ("cyan", Color::CYAN),
    ("magenta", Color::MAGENTA),
    ("yellow", Color::YELLOW),
];

impl From<[u8; 3]> for Color {
    fn from(c: [u8; 3]) -> Self {
        Color::rgb(c[0], c[1], c[2])
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb(c.to_array())
    }
}

impl FromStr for Color {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_name(s).ok_or_else(|| OverlayError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A color given either by palette name or as an `[r, g, b]` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Named(String),
    Rgb([u8; 3]),
}

impl ColorSpec {
    pub fn resolve(&self) -> Result<Color, OverlayError> {
        match self {
            ColorSpec::Named(name) => name.parse(),
            ColorSpec::Rgb(c) => Ok(Color::from(*c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup() {
        assert_eq!(Color::from_name("red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_name("Yellow"), Some(Color::rgb(255, 255, 0)));
        assert_eq!(Color::from_name(" CYAN "), Some(Color::CYAN));
        assert_eq!(Color::from_name("orange"), None);
    }

    #[test]
    fn test_palette_has_eight_entries() {
        assert_eq!(Color::palette().len(), 8);
        assert!(Color::palette().iter().any(|(n, c)| *n == "magenta" && *c == Color::MAGENTA));
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "teal".parse::<Color>().unwrap_err();
        assert_eq!(err, OverlayError::UnknownColor("teal".to_string()));
    }

    #[test]
    fn test_color_spec_resolve() {
        assert_eq!(ColorSpec::Named("blue".into()).resolve(), Ok(Color::BLUE));
        assert_eq!(ColorSpec::Rgb([1, 2, 3]).resolve(), Ok(Color::rgb(1, 2, 3)));
    }
}
