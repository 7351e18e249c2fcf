//! Webcam Viewer - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use webcam_session::{
    init_logging, open_default_display, CaptureSession, SessionConfig, DEFAULT_CONFIG_PATH,
};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = SessionConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== Webcam Viewer v{} ===", env!("CARGO_PKG_VERSION"));

    let camera = camera_capture::open_default(&config.camera)?;
    let mut session = CaptureSession::from_config(&config, camera)?;
    info!("{}", session);

    let mut display = open_default_display(&config.headless);
    let summary = session.run(display.as_mut())?;

    info!("Session closed after {} frames ({:?})", summary.frames, summary.exit);
    Ok(())
}
