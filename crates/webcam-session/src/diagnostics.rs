//! Resolution and frame-rate overlay

use overlay::{Color, Point, TextLabel};

/// Scale value that leaves frames at native size
pub const NATIVE_SCALE: f64 = 100.0;

pub const DIAGNOSTIC_FONT_SIZE: f32 = 0.6;
pub const DIAGNOSTIC_THICKNESS: i32 = 1;
pub const DIAGNOSTIC_COLOR: Color = Color::BLACK;

pub const WIDTH_ANCHOR: Point = Point::new(500, 50);
pub const HEIGHT_ANCHOR: Point = Point::new(500, 80);
pub const FPS_ANCHOR: Point = Point::new(500, 110);

/// Display size for `scale` percent of the native size, truncated
pub fn target_dimensions(width: f64, height: f64, scale: f64) -> (u32, u32) {
    ((width * scale / 100.0) as u32, (height * scale / 100.0) as u32)
}

/// Width, height and FPS labels, in draw order
pub fn diagnostic_labels(target: (u32, u32), fps: f64) -> [TextLabel; 3] {
    let label = |text: String, anchor: Point| {
        TextLabel::new(
            text,
            anchor,
            DIAGNOSTIC_FONT_SIZE,
            DIAGNOSTIC_COLOR,
            DIAGNOSTIC_THICKNESS,
        )
    };
    [
        label(format!("Largura:{}", target.0), WIDTH_ANCHOR),
        label(format!("Altura:{}", target.1), HEIGHT_ANCHOR),
        label(format!("FPS:{}", format_fps(fps)), FPS_ANCHOR),
    ]
}

/// `30.0` prints as `30`, `29.97` as `29.97`
fn format_fps(fps: f64) -> String {
    if fps.is_finite() && fps.fract() == 0.0 {
        format!("{}", fps as i64)
    } else {
        format!("{:.2}", fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_half_scale() {
        assert_eq!(target_dimensions(640.0, 480.0, 50.0), (320, 240));
        assert_eq!(target_dimensions(640.0, 480.0, 100.0), (640, 480));
        assert_eq!(target_dimensions(640.0, 480.0, 33.0), (211, 158));
    }

    #[test]
    fn test_labels() {
        let labels = diagnostic_labels((320, 240), 30.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Largura:320", "Altura:240", "FPS:30"]);
        assert!(labels.iter().all(|l| l.color == Color::BLACK && l.thickness == 1));
        assert_eq!(labels[2].anchor, Point::new(500, 110));
    }

    #[test]
    fn test_fractional_fps() {
        assert_eq!(format_fps(29.97), "29.97");
        assert_eq!(format_fps(0.0), "0");
    }

    proptest! {
        #[test]
        fn target_is_floor_of_scaled_native(w in 1u32..4000, h in 1u32..4000, s in 1u32..400) {
            let (tw, th) = target_dimensions(w as f64, h as f64, s as f64);
            prop_assert_eq!(tw as u64, (w as u64 * s as u64) / 100);
            prop_assert_eq!(th as u64, (h as u64 * s as u64) / 100);
        }
    }
}
