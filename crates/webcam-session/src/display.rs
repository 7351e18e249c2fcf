//! Display surfaces for rendered frames

use std::collections::VecDeque;
use std::path::PathBuf;

use camera_capture::VideoFrame;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::HeadlessConfig;

/// Key code that ends a capture session
pub const ESCAPE_KEY: i32 = 27;

/// Display error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("Failed to show frame: {0}")]
    Show(String),

    #[error("Key polling failed: {0}")]
    Poll(String),

    #[error("Failed to write snapshot: {0}")]
    Snapshot(String),

    #[error("Failed to close display: {0}")]
    Close(String),
}

/// Something that can present a raster frame and report one key per poll
pub trait DisplaySurface {
    /// Present `frame` in the window named `title`
    fn show(&mut self, title: &str, frame: &VideoFrame) -> Result<(), DisplayError>;

    /// Wait up to `delay_ms` for a key press
    fn poll_key(&mut self, delay_ms: i32) -> Result<Option<i32>, DisplayError>;

    /// Tear the surface down; must be idempotent
    fn destroy(&mut self) -> Result<(), DisplayError>;
}

/// Window-less display for tests and machines without a desktop.
///
/// Keeps the last frame, replays a scripted key sequence and can press
/// escape on its own after a number of frames.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    title: Option<String>,
    last_frame: Option<VideoFrame>,
    frames_shown: u64,
    keys: VecDeque<i32>,
    escape_after: Option<u64>,
    snapshot_path: Option<PathBuf>,
    destroyed: bool,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &HeadlessConfig) -> Self {
        Self {
            escape_after: config.escape_after,
            snapshot_path: config.snapshot_path.clone(),
            ..Self::default()
        }
    }

    /// Report escape once `frames` frames have been shown
    pub fn escape_after(mut self, frames: u64) -> Self {
        self.escape_after = Some(frames);
        self
    }

    /// Keys returned by successive polls, before any automatic escape
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = i32>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Write the last frame as PNG to `path` on destroy
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn last_frame(&self) -> Option<&VideoFrame> {
        self.last_frame.as_ref()
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn show(&mut self, title: &str, frame: &VideoFrame) -> Result<(), DisplayError> {
        if self.destroyed {
            return Err(DisplayError::Show("display already destroyed".to_string()));
        }
        if self.title.as_deref() != Some(title) {
            self.title = Some(title.to_string());
        }
        self.last_frame = Some(frame.clone());
        self.frames_shown += 1;
        Ok(())
    }

    fn poll_key(&mut self, _delay_ms: i32) -> Result<Option<i32>, DisplayError> {
        if let Some(key) = self.keys.pop_front() {
            return Ok(Some(key));
        }
        match self.escape_after {
            Some(limit) if self.frames_shown >= limit => Ok(Some(ESCAPE_KEY)),
            _ => Ok(None),
        }
    }

    fn destroy(&mut self) -> Result<(), DisplayError> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;

        if let (Some(path), Some(frame)) = (&self.snapshot_path, &self.last_frame) {
            frame
                .clone()
                .into_rgb_image()
                .save(path)
                .map_err(|e| DisplayError::Snapshot(format!("{}: {}", path.display(), e)))?;
            info!("Wrote snapshot {}", path.display());
        }
        debug!("Headless display closed after {} frames", self.frames_shown);
        Ok(())
    }
}

#[cfg(feature = "opencv")]
pub use self::highgui_display::HighGuiDisplay;

#[cfg(feature = "opencv")]
mod highgui_display {
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::{highgui, imgproc};
    use tracing::debug;

    use super::{DisplayError, DisplaySurface};
    use camera_capture::VideoFrame;

    /// On-screen window backed by OpenCV `highgui`
    #[derive(Debug, Default)]
    pub struct HighGuiDisplay {
        window: Option<String>,
    }

    impl HighGuiDisplay {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DisplaySurface for HighGuiDisplay {
        fn show(&mut self, title: &str, frame: &VideoFrame) -> Result<(), DisplayError> {
            if self.window.as_deref() != Some(title) {
                highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
                    .map_err(|e| DisplayError::Show(e.to_string()))?;
                self.window = Some(title.to_string());
            }

            let flat = Mat::from_slice(&frame.data).map_err(|e| DisplayError::Show(e.to_string()))?;
            let rgb = flat
                .reshape(3, frame.height as i32)
                .map_err(|e| DisplayError::Show(e.to_string()))?;
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(&*rgb, &mut bgr, imgproc::COLOR_RGB2BGR)
                .map_err(|e| DisplayError::Show(e.to_string()))?;

            highgui::imshow(title, &bgr).map_err(|e| DisplayError::Show(e.to_string()))
        }

        fn poll_key(&mut self, delay_ms: i32) -> Result<Option<i32>, DisplayError> {
            let key = highgui::wait_key(delay_ms).map_err(|e| DisplayError::Poll(e.to_string()))?;
            Ok(if key < 0 { None } else { Some(key) })
        }

        fn destroy(&mut self) -> Result<(), DisplayError> {
            if let Some(window) = self.window.take() {
                highgui::destroy_window(&window).map_err(|e| DisplayError::Close(e.to_string()))?;
                debug!("Destroyed window {}", window);
            }
            Ok(())
        }
    }

    impl Drop for HighGuiDisplay {
        fn drop(&mut self) {
            let _ = self.destroy();
        }
    }
}

/// Display surface for this build: a `highgui` window with the `opencv`
/// feature, otherwise a headless surface driven by `config`.
#[cfg(feature = "opencv")]
pub fn open_default_display(_config: &HeadlessConfig) -> Box<dyn DisplaySurface> {
    Box::new(HighGuiDisplay::new())
}

/// Display surface for this build: a `highgui` window with the `opencv`
/// feature, otherwise a headless surface driven by `config`.
#[cfg(not(feature = "opencv"))]
pub fn open_default_display(config: &HeadlessConfig) -> Box<dyn DisplaySurface> {
    Box::new(HeadlessDisplay::from_config(config))
}
