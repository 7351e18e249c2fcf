//! Video frame types and processing

use image::RgbImage;

/// Decoded RGB video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// Create a frame where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height, 0)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Set pixel at (x, y); out-of-bounds writes are ignored
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Wrap an `image` buffer as a frame
    pub fn from_rgb_image(image: RgbImage, sequence: u64) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, sequence)
    }

    /// Convert into an `image` buffer (no copy)
    pub fn into_rgb_image(self) -> RgbImage {
        let (width, height) = (self.width, self.height);
        // Length is checked by `new`; an empty buffer still yields a valid image.
        RgbImage::from_raw(width, height, self.data)
            .unwrap_or_else(|| RgbImage::new(width, height))
    }

    /// Run `f` on an `image` view of this frame, in place
    pub fn with_rgb_image<R>(&mut self, f: impl FnOnce(&mut RgbImage) -> R) -> R {
        let data = std::mem::take(&mut self.data);
        let mut image = RgbImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height));
        let result = f(&mut image);
        self.data = image.into_raw();
        result
    }

    /// Resize using area interpolation.
    ///
    /// Each destination pixel is the mean of the source region it covers,
    /// with partially covered source pixels weighted by their coverage.
    pub fn resize_area(&self, new_width: u32, new_height: u32) -> VideoFrame {
        if new_width == 0 || new_height == 0 || self.width == 0 || self.height == 0 {
            return VideoFrame {
                data: Vec::new(),
                width: new_width,
                height: new_height,
                sequence: self.sequence,
            };
        }
        if new_width == self.width && new_height == self.height {
            return self.clone();
        }

        let x_spans = coverage_spans(self.width, new_width);
        let y_spans = coverage_spans(self.height, new_height);

        let mut resized = Vec::with_capacity(new_width as usize * new_height as usize * 3);
        for row in &y_spans {
            for col in &x_spans {
                let mut acc = [0.0f64; 3];
                let mut total = 0.0f64;
                for &(sy, wy) in row {
                    let base = sy as usize * self.width as usize;
                    for &(sx, wx) in col {
                        let w = wx * wy;
                        let idx = (base + sx as usize) * 3;
                        acc[0] += self.data[idx] as f64 * w;
                        acc[1] += self.data[idx + 1] as f64 * w;
                        acc[2] += self.data[idx + 2] as f64 * w;
                        total += w;
                    }
                }
                for channel in acc {
                    resized.push((channel / total).round().clamp(0.0, 255.0) as u8);
                }
            }
        }

        VideoFrame {
            data: resized,
            width: new_width,
            height: new_height,
            sequence: self.sequence,
        }
    }
}

/// For each destination index, the source indices it overlaps and the
/// overlap length in source-pixel units.
fn coverage_spans(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f64)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = start + ratio;
            let mut spans = Vec::new();
            let mut s = start.floor();
            while s < end {
                let weight = end.min(s + 1.0) - start.max(s);
                if weight > 1e-9 {
                    spans.push(((s as u32).min(src_len - 1), weight));
                }
                s += 1.0;
            }
            spans
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_get_and_put_pixel() {
        let mut frame = VideoFrame::filled(4, 3, [0, 0, 0]);
        frame.put_pixel(2, 1, [10, 20, 30]);
        assert_eq!(frame.get_pixel(2, 1), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(4, 0), None);

        // Ignored, not a panic
        frame.put_pixel(9, 9, [1, 1, 1]);
    }

    #[test]
    fn test_halving_averages_blocks() {
        let mut frame = VideoFrame::filled(4, 2, [0, 0, 0]);
        frame.put_pixel(0, 0, [200, 0, 0]);
        frame.put_pixel(1, 0, [200, 0, 0]);

        let half = frame.resize_area(2, 1);
        assert_eq!((half.width, half.height), (2, 1));
        assert_eq!(half.get_pixel(0, 0), Some([100, 0, 0]));
        assert_eq!(half.get_pixel(1, 0), Some([0, 0, 0]));
    }

    #[test]
    fn test_fractional_coverage_is_weighted() {
        // 3 -> 2: destination 0 covers source [0, 1.5)
        let mut frame = VideoFrame::filled(3, 1, [0, 0, 0]);
        frame.put_pixel(0, 0, [90, 90, 90]);
        let resized = frame.resize_area(2, 1);
        assert_eq!(resized.get_pixel(0, 0), Some([60, 60, 60]));
        assert_eq!(resized.get_pixel(1, 0), Some([0, 0, 0]));
    }

    #[test]
    fn test_upscale_replicates() {
        let frame = VideoFrame::filled(2, 2, [7, 8, 9]);
        let big = frame.resize_area(5, 3);
        assert_eq!(big.data.len(), 5 * 3 * 3);
        assert!(big.data.chunks(3).all(|p| p == [7, 8, 9]));
    }

    #[test]
    fn test_image_round_trip_in_place() {
        let mut frame = VideoFrame::filled(3, 3, [1, 2, 3]);
        frame.with_rgb_image(|img| img.put_pixel(1, 1, image::Rgb([9, 9, 9])));
        assert_eq!(frame.get_pixel(1, 1), Some([9, 9, 9]));
        assert_eq!(frame.data.len(), 27);
    }

    proptest! {
        #[test]
        fn resize_area_preserves_solid_color(
            w in 1u32..40, h in 1u32..40, nw in 1u32..40, nh in 1u32..40, v in any::<u8>()
        ) {
            let frame = VideoFrame::filled(w, h, [v, v, v]);
            let resized = frame.resize_area(nw, nh);
            prop_assert_eq!(resized.data.len(), (nw * nh * 3) as usize);
            prop_assert!(resized.data.iter().all(|&c| c == v));
        }
    }
}
