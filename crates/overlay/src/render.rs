//! Rasterizing annotations onto frames

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use camera_capture::VideoFrame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::{Annotation, Color, OverlayError, Rectangle, TextLabel};

/// Locations probed for a TrueType font when none is configured
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// DejaVu Sans, used when no system font is found
pub const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Upper bound on offset passes per axis for thick text
pub const MAX_TEXT_PASSES: i32 = 8;

/// Draws annotations in order; later entries paint over earlier ones.
pub struct Painter {
    font: Option<FontArc>,
    missing_font_reported: AtomicBool,
}

impl Painter {
    pub fn new(font: Option<FontArc>) -> Self {
        Self {
            font,
            missing_font_reported: AtomicBool::new(false),
        }
    }

    /// Painter that draws rectangles only; text is skipped
    pub fn without_font() -> Self {
        Self::new(None)
    }

    /// Painter using the bundled DejaVu Sans
    pub fn bundled() -> Result<Self, OverlayError> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| OverlayError::Font(format!("bundled font: {}", e)))?;
        Ok(Self::new(Some(font)))
    }

    /// Load the font at `path`, or probe `FONT_SEARCH_PATHS` when `None`.
    ///
    /// An explicit path that cannot be loaded is an error. Probing that finds
    /// nothing falls back to the bundled font.
    pub fn load(path: Option<&Path>) -> Result<Self, OverlayError> {
        if let Some(path) = path {
            let font = load_font(path)?;
            info!("Loaded overlay font {}", path.display());
            return Ok(Self::new(Some(font)));
        }

        for candidate in FONT_SEARCH_PATHS.iter().map(PathBuf::from) {
            if !candidate.is_file() {
                continue;
            }
            match load_font(&candidate) {
                Ok(font) => {
                    info!("Loaded overlay font {}", candidate.display());
                    return Ok(Self::new(Some(font)));
                }
                Err(e) => debug!("Skipping font {}: {}", candidate.display(), e),
            }
        }

        info!("No system font found; using bundled DejaVu Sans");
        Self::bundled()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Paint every annotation onto `frame`, in slice order
    pub fn paint(&self, frame: &mut VideoFrame, annotations: &[Annotation]) {
        if frame.width == 0 || frame.height == 0 || annotations.is_empty() {
            return;
        }
        frame.with_rgb_image(|image| {
            for annotation in annotations {
                match annotation {
                    Annotation::Rectangle(rect) => paint_rectangle(image, rect),
                    Annotation::Text(label) => self.paint_text(image, label),
                }
            }
        });
    }

    fn paint_text(&self, image: &mut RgbImage, label: &TextLabel) {
        let Some(font) = &self.font else {
            if !self.missing_font_reported.swap(true, Ordering::Relaxed) {
                warn!("Skipping text overlay {:?}: no font loaded", label.text);
            }
            return;
        };
        if label.text.is_empty() || label.pixel_height() <= 0.0 {
            return;
        }

        let scale = PxScale::from(label.pixel_height());
        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent().round() as i32;
        let color: Rgb<u8> = label.color.into();

        // Heavier strokes are approximated by one-pixel offset passes.
        let passes = label.thickness.clamp(1, MAX_TEXT_PASSES);
        let shift = (passes - 1) / 2;

        // Labels whose box misses the frame are skipped before any i32 offset math.
        let (text_width, _) = text_size(scale, font, &label.text);
        let text_height = (scaled.ascent() - scaled.descent()).ceil() as i64;
        let left = label.anchor.x as i64 - shift as i64;
        let top = label.anchor.y as i64 - ascent as i64 - shift as i64;
        let reach = passes as i64;
        if left + text_width as i64 + reach < 0
            || top + text_height + reach < 0
            || left - reach > image.width() as i64
            || top - reach > image.height() as i64
        {
            debug!("Text overlay {:?} lies outside the frame", label.text);
            return;
        }
        let (Ok(left), Ok(top)) = (i32::try_from(left), i32::try_from(top)) else {
            return;
        };

        for dy in 0..passes {
            for dx in 0..passes {
                draw_text_mut(&mut *image, color, left + dx, top + dy, scale, font, &label.text);
            }
        }
    }
}

impl Default for Painter {
    fn default() -> Self {
        Self::without_font()
    }
}

fn load_font(path: &Path) -> Result<FontArc, OverlayError> {
    let bytes = std::fs::read(path)
        .map_err(|e| OverlayError::Font(format!("{}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes).map_err(|e| OverlayError::Font(format!("{}: {}", path.display(), e)))
}

/// Outline bands are centered on the rectangle edges, like OpenCV strokes.
fn paint_rectangle(image: &mut RgbImage, rect: &Rectangle) {
    let x0 = rect.top_left.x.min(rect.bottom_right.x);
    let x1 = rect.top_left.x.max(rect.bottom_right.x);
    let y0 = rect.top_left.y.min(rect.bottom_right.y);
    let y1 = rect.top_left.y.max(rect.bottom_right.y);

    if rect.is_filled() {
        fill_band(image, (x0, x1), (y0, y1), rect.color);
        return;
    }

    let lo = rect.thickness / 2;
    let hi = rect.thickness - 1 - lo;
    let outer_x = (x0.saturating_sub(lo), x1.saturating_add(hi));
    let outer_y = (y0.saturating_sub(lo), y1.saturating_add(hi));

    fill_band(image, outer_x, (y0.saturating_sub(lo), y0.saturating_add(hi)), rect.color);
    fill_band(image, outer_x, (y1.saturating_sub(lo), y1.saturating_add(hi)), rect.color);
    fill_band(image, (x0.saturating_sub(lo), x0.saturating_add(hi)), outer_y, rect.color);
    fill_band(image, (x1.saturating_sub(lo), x1.saturating_add(hi)), outer_y, rect.color);
}

/// Fill the inclusive span `xs` x `ys`, clipped to the image
fn fill_band(image: &mut RgbImage, xs: (i32, i32), ys: (i32, i32), color: Color) {
    let (width, height) = (image.width() as i32, image.height() as i32);
    let (xa, xb) = (xs.0.max(0), xs.1.min(width - 1));
    let (ya, yb) = (ys.0.max(0), ys.1.min(height - 1));
    if xa > xb || ya > yb {
        return;
    }
    let area = Rect::at(xa, ya).of_size((xb - xa + 1) as u32, (yb - ya + 1) as u32);
    draw_filled_rect_mut(image, area, color.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn black(width: u32, height: u32) -> VideoFrame {
        VideoFrame::filled(width, height, [0, 0, 0])
    }

    #[test]
    fn test_outline_thickness_two() {
        let mut frame = black(120, 120);
        let rect = Rectangle::new((10, 10), (100, 100), Color::RED, 2);
        Painter::without_font().paint(&mut frame, &[rect.into()]);

        // lo = 1, hi = 0: band covers 9..=10 on each edge
        assert_eq!(frame.get_pixel(9, 50), Some([255, 0, 0]));
        assert_eq!(frame.get_pixel(10, 50), Some([255, 0, 0]));
        assert_eq!(frame.get_pixel(11, 50), Some([0, 0, 0]));
        assert_eq!(frame.get_pixel(8, 50), Some([0, 0, 0]));
        assert_eq!(frame.get_pixel(100, 100), Some([255, 0, 0]));
        assert_eq!(frame.get_pixel(55, 55), Some([0, 0, 0]));
    }

    #[test]
    fn test_filled_rectangle() {
        let mut frame = black(20, 20);
        let rect = Rectangle::new((2, 2), (5, 5), Color::GREEN, -1);
        Painter::without_font().paint(&mut frame, &[rect.into()]);
        assert_eq!(frame.get_pixel(3, 4), Some([0, 255, 0]));
        assert_eq!(frame.get_pixel(6, 6), Some([0, 0, 0]));
    }

    #[test]
    fn test_corner_order_is_normalized() {
        let mut frame = black(20, 20);
        let rect = Rectangle::new((15, 15), (5, 5), Color::BLUE, 1);
        Painter::without_font().paint(&mut frame, &[rect.into()]);
        assert_eq!(frame.get_pixel(5, 10), Some([0, 0, 255]));
        assert_eq!(frame.get_pixel(15, 10), Some([0, 0, 255]));
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut frame = black(10, 10);
        let rect = Rectangle::new((-50, -50), (500, 5), Color::WHITE, 3);
        Painter::without_font().paint(&mut frame, &[rect.into()]);
        assert_eq!(frame.get_pixel(4, 5), Some([255, 255, 255]));
        assert_eq!(frame.data.len(), 300);

        let far = Rectangle::new((1000, 1000), (2000, 2000), Color::WHITE, 2);
        let before = frame.clone();
        Painter::without_font().paint(&mut frame, &[far.into()]);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_later_annotations_paint_over_earlier() {
        let mut frame = black(30, 30);
        let first = Rectangle::new((5, 5), (20, 20), Color::RED, -1);
        let second = Rectangle::new((10, 10), (25, 25), Color::BLUE, -1);
        Painter::without_font().paint(&mut frame, &[first.into(), second.into()]);
        assert_eq!(frame.get_pixel(15, 15), Some([0, 0, 255]));
        assert_eq!(frame.get_pixel(7, 7), Some([255, 0, 0]));
    }

    #[test]
    fn test_text_without_font_leaves_frame_untouched() {
        let mut frame = black(50, 50);
        let label = TextLabel::new("hello", Point::new(5, 30), 1.0, Color::WHITE, 2);
        let painter = Painter::without_font();
        painter.paint(&mut frame, &[label.clone().into()]);
        painter.paint(&mut frame, &[label.into()]);
        assert!(frame.data.iter().all(|&c| c == 0));
        assert!(!painter.has_font());
    }

    #[test]
    fn test_missing_explicit_font_is_an_error() {
        let result = Painter::load(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(OverlayError::Font(_))));
    }

    #[test]
    fn test_text_with_bundled_font_draws_pixels() {
        let painter = Painter::bundled().unwrap();
        assert!(painter.has_font());
        let mut frame = black(200, 60);
        let label = TextLabel::new("FPS:30", Point::new(10, 40), 1.0, Color::WHITE, 1);
        painter.paint(&mut frame, &[label.into()]);
        assert!(frame.data.iter().any(|&c| c > 0));

        // Glyphs sit above the baseline
        let below = (45..60)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get_pixel(x, y) != Some([0, 0, 0]))
            .count();
        assert_eq!(below, 0);
    }

    #[test]
    fn test_probing_always_yields_a_font() {
        assert!(Painter::load(None).unwrap().has_font());
    }

    #[test]
    fn test_text_far_outside_frame_is_ignored() {
        let painter = Painter::bundled().unwrap();
        let mut frame = black(40, 40);
        let anchors = [
            Point::new(i32::MAX, i32::MAX),
            Point::new(i32::MIN, i32::MIN),
            Point::new(i32::MAX, 20),
            Point::new(5, i32::MIN),
        ];
        for anchor in anchors {
            let label = TextLabel::new("x", anchor, 1.0, Color::RED, 3);
            painter.paint(&mut frame, &[label.into()]);
        }
        assert!(frame.data.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_partially_visible_text_is_clipped() {
        let painter = Painter::bundled().unwrap();
        let mut frame = black(40, 40);
        let label = TextLabel::new("WWWW", Point::new(-10, 20), 1.0, Color::WHITE, 2);
        painter.paint(&mut frame, &[label.into()]);
        assert!(frame.data.iter().any(|&c| c > 0));
        assert_eq!(frame.data.len(), 40 * 40 * 3);
    }

    #[test]
    fn test_huge_text_thickness_is_capped() {
        let painter = Painter::bundled().unwrap();
        let mut frame = black(60, 40);
        let label = TextLabel::new("A", Point::new(10, 30), 1.0, Color::WHITE, i32::MAX);
        painter.paint(&mut frame, &[label.into()]);

        let mut capped = black(60, 40);
        let label = TextLabel::new("A", Point::new(10, 30), 1.0, Color::WHITE, MAX_TEXT_PASSES);
        painter.paint(&mut capped, &[label.into()]);
        assert_eq!(frame, capped);
    }
}
