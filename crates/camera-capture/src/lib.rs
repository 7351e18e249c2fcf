//! Camera Capture Library
//!
//! Device boundary for the webcam session:
//! - `CaptureDevice` trait implemented by every frame source
//! - Packed RGB24 `VideoFrame` with area-based resizing
//! - Deterministic `SyntheticCamera` for tests and headless runs
//! - OpenCV `videoio` backend (feature `opencv`)

pub mod frame;
pub mod synthetic;
#[cfg(feature = "opencv")]
pub mod webcam;

pub use frame::VideoFrame;
#[cfg(feature = "opencv")]
pub use webcam::OpenCvCamera;
pub use synthetic::{FillPattern, SyntheticCamera};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Property query failed: {0}")]
    Property(String),

    #[error("Camera not initialized")]
    NotInitialized,
}

/// Stream properties as reported by the device driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureProperties {
    /// Native frame width in pixels
    pub width: f64,
    /// Native frame height in pixels
    pub height: f64,
    /// Reported frame rate
    pub fps: f64,
}

/// A source of video frames.
///
/// One handle per device; `release` must be idempotent so that every exit
/// path of a capture loop may call it.
pub trait CaptureDevice {
    /// Whether the device is open and ready to deliver frames
    fn is_opened(&self) -> bool;

    /// Read the next frame (blocking)
    fn read_frame(&mut self) -> Result<VideoFrame, CameraError>;

    /// Query native width, height and frame rate
    fn properties(&self) -> Result<CaptureProperties, CameraError>;

    /// Release the device handle
    fn release(&mut self);
}

impl<T: CaptureDevice + ?Sized> CaptureDevice for Box<T> {
    fn is_opened(&self) -> bool {
        (**self).is_opened()
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        (**self).read_frame()
    }

    fn properties(&self) -> Result<CaptureProperties, CameraError> {
        (**self).properties()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index (0 = system default camera)
    pub device_index: i32,
    /// Frame width of the synthetic source
    pub width: u32,
    /// Frame height of the synthetic source
    pub height: u32,
    /// Frame rate reported by the synthetic source
    pub fps: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30.0,
        }
    }
}

/// Open the default capture backend for this build.
///
/// With the `opencv` feature this is the real webcam at `device_index`;
/// otherwise a synthetic gradient source with the configured geometry.
#[cfg(feature = "opencv")]
pub fn open_default(config: &CameraConfig) -> Result<DefaultCamera, CameraError> {
    OpenCvCamera::open(config.device_index)
}

/// Open the default capture backend for this build.
///
/// With the `opencv` feature this is the real webcam at `device_index`;
/// otherwise a synthetic gradient source with the configured geometry.
#[cfg(not(feature = "opencv"))]
pub fn open_default(config: &CameraConfig) -> Result<DefaultCamera, CameraError> {
    Ok(SyntheticCamera::from_config(config))
}

/// Capture backend selected at compile time
#[cfg(feature = "opencv")]
pub type DefaultCamera = OpenCvCamera;

/// Capture backend selected at compile time
#[cfg(not(feature = "opencv"))]
pub type DefaultCamera = SyntheticCamera;
