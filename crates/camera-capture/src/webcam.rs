//! OpenCV `videoio` webcam backend

use ::opencv::core::Mat;
use ::opencv::imgproc;
use ::opencv::prelude::*;
use ::opencv::videoio::{self, VideoCapture};
use tracing::{info, warn};

use crate::{CameraError, CaptureDevice, CaptureProperties, VideoFrame};

/// Webcam opened through OpenCV
pub struct OpenCvCamera {
    capture: VideoCapture,
    device_index: i32,
    sequence: u64,
    released: bool,
}

impl OpenCvCamera {
    /// Open the camera at `device_index` (0 = system default).
    ///
    /// The handle is returned even if the driver reports it closed; callers
    /// check `is_opened` before starting a capture loop.
    pub fn open(device_index: i32) -> Result<Self, CameraError> {
        let capture = VideoCapture::new(device_index, videoio::CAP_ANY)
            .map_err(|e| CameraError::Open(e.to_string()))?;

        info!("Opened camera device {}", device_index);

        Ok(Self {
            capture,
            device_index,
            sequence: 0,
            released: false,
        })
    }

    fn property(&self, id: i32) -> Result<f64, CameraError> {
        self.capture
            .get(id)
            .map_err(|e| CameraError::Property(e.to_string()))
    }
}

impl CaptureDevice for OpenCvCamera {
    fn is_opened(&self) -> bool {
        !self.released && self.capture.is_opened().unwrap_or(false)
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::NotInitialized);
        }

        let mut bgr = Mat::default();
        let ok = self
            .capture
            .read(&mut bgr)
            .map_err(|e| CameraError::Read(e.to_string()))?;
        if !ok || bgr.empty() {
            return Err(CameraError::Read(format!(
                "device {} returned no frame",
                self.device_index
            )));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)
            .map_err(|e| CameraError::Read(e.to_string()))?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb
            .data_bytes()
            .map_err(|e| CameraError::Read(e.to_string()))?
            .to_vec();

        let frame = VideoFrame::new(data, width, height, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn properties(&self) -> Result<CaptureProperties, CameraError> {
        Ok(CaptureProperties {
            width: self.property(videoio::CAP_PROP_FRAME_WIDTH)?,
            height: self.property(videoio::CAP_PROP_FRAME_HEIGHT)?,
            fps: self.property(videoio::CAP_PROP_FPS)?,
        })
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.capture.release() {
            warn!("Failed to release camera {}: {}", self.device_index, e);
        }
        self.released = true;
        info!("Released camera device {}", self.device_index);
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}
