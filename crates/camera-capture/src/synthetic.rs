//! Synthetic frame source
//!
//! Produces deterministic frames with a fixed geometry and frame rate, so the
//! capture loop can run without a webcam.

use tracing::debug;

use crate::{CameraConfig, CameraError, CaptureDevice, CaptureProperties, VideoFrame};

/// Pixel content of synthetic frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    /// Every pixel the same RGB color
    Solid([u8; 3]),
    /// Horizontal red ramp, vertical green ramp, blue tracks the sequence
    Gradient,
}

/// Deterministic in-memory camera
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    fps: f64,
    pattern: FillPattern,
    opened: bool,
    fail_after: Option<u64>,
    frames_read: u64,
    releases: u32,
}

impl SyntheticCamera {
    /// Create an open camera producing gradient frames
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            pattern: FillPattern::Gradient,
            opened: true,
            fail_after: None,
            frames_read: 0,
            releases: 0,
        }
    }

    /// Create from camera configuration geometry
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.width, config.height, config.fps)
    }

    /// A camera that never opened, as when no device is attached
    pub fn unavailable() -> Self {
        Self {
            opened: false,
            ..Self::new(0, 0, 0.0)
        }
    }

    /// Use the given fill pattern
    pub fn with_pattern(mut self, pattern: FillPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Deliver `frames` good frames, then fail every read
    pub fn fail_after(mut self, frames: u64) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Number of successful reads so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Number of times `release` was called on an open handle
    pub fn release_count(&self) -> u32 {
        self.releases
    }

    fn render(&self, sequence: u64) -> VideoFrame {
        match self.pattern {
            FillPattern::Solid(rgb) => {
                let mut frame = VideoFrame::filled(self.width, self.height, rgb);
                frame.sequence = sequence;
                frame
            }
            FillPattern::Gradient => {
                let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
                let blue = (sequence % 256) as u8;
                for y in 0..self.height {
                    let green = (y * 255 / self.height.max(1)) as u8;
                    for x in 0..self.width {
                        let red = (x * 255 / self.width.max(1)) as u8;
                        data.extend_from_slice(&[red, green, blue]);
                    }
                }
                VideoFrame::new(data, self.width, self.height, sequence)
            }
        }
    }
}

impl CaptureDevice for SyntheticCamera {
    fn is_opened(&self) -> bool {
        self.opened
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        if !self.opened {
            return Err(CameraError::NotInitialized);
        }
        if let Some(limit) = self.fail_after {
            if self.frames_read >= limit {
                return Err(CameraError::Read(format!(
                    "synthetic source exhausted after {} frames",
                    limit
                )));
            }
        }
        let frame = self.render(self.frames_read);
        self.frames_read += 1;
        Ok(frame)
    }

    fn properties(&self) -> Result<CaptureProperties, CameraError> {
        if !self.opened {
            return Err(CameraError::NotInitialized);
        }
        Ok(CaptureProperties {
            width: self.width as f64,
            height: self.height as f64,
            fps: self.fps,
        })
    }

    fn release(&mut self) {
        if self.opened {
            debug!("Releasing synthetic camera after {} frames", self.frames_read);
            self.opened = false;
            self.releases += 1;
        }
    }
}
