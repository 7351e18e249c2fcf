//! Webcam Session
//!
//! Opens one camera, replays registered rectangle and text overlays onto
//! every frame, optionally draws resolution/FPS diagnostics, rescales and
//! presents the result until escape is pressed.

pub mod config;
pub mod diagnostics;
pub mod display;
pub mod session;

pub use config::{HeadlessConfig, SessionConfig, DEFAULT_CONFIG_PATH};
pub use display::{open_default_display, DisplayError, DisplaySurface, HeadlessDisplay, ESCAPE_KEY};
#[cfg(feature = "opencv")]
pub use display::HighGuiDisplay;
pub use session::{CaptureSession, ExitReason, RunSummary, SessionState};

pub use camera_capture::{CaptureDevice, CaptureProperties, VideoFrame};
pub use overlay::{Color, Point};

use camera_capture::{CameraConfig, DefaultCamera};
use overlay::OverlayError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Camera not found: {0}")]
    DeviceUnavailable(String),

    #[error("Could not capture a frame from the camera: {0}")]
    FrameCapture(String),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<OverlayError> for SessionError {
    fn from(err: OverlayError) -> Self {
        SessionError::Config(err.to_string())
    }
}

/// Open the system default camera and wrap it in a session
pub fn open_default(scale: f64, show_info: bool) -> Result<CaptureSession<DefaultCamera>, SessionError> {
    let camera = camera_capture::open_default(&CameraConfig::default())
        .map_err(|e| SessionError::DeviceUnavailable(e.to_string()))?;
    CaptureSession::new(camera, scale, show_info)
}

/// Initialize logging at `level`, as plain text or JSON lines
pub fn init_logging(level: &str, json: bool) -> Result<(), SessionError> {
    let level: Level = level
        .parse()
        .map_err(|_| SessionError::Config(format!("unknown log level {:?}", level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| SessionError::Config(format!("Failed to set tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_errors_become_config_errors() {
        let err: SessionError = OverlayError::UnknownColor("teal".into()).into();
        assert!(matches!(err, SessionError::Config(msg) if msg.contains("teal")));
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        assert!(matches!(init_logging("chatty", false), Err(SessionError::Config(_))));
    }

    #[cfg(not(feature = "opencv"))]
    #[test]
    fn test_open_default_is_ready() {
        let session = open_default(100.0, false).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert!(session.device().is_opened());
    }
}
