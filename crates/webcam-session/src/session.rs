//! Capture-and-render session

use std::fmt;
use std::path::Path;

use camera_capture::{CaptureDevice, CaptureProperties, VideoFrame};
use overlay::{Annotation, Color, Overlays, Painter, Point, DEFAULT_THICKNESS};
use tracing::{debug, error, info, warn};

use crate::config::{validate_scale, SessionConfig};
use crate::diagnostics::{diagnostic_labels, target_dimensions, NATIVE_SCALE};
use crate::display::{DisplaySurface, ESCAPE_KEY};
use crate::SessionError;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Device held, no loop running
    Open,
    /// Render loop active
    Running,
    /// Device released; terminal
    Closed,
}

/// Why a render loop ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    EscapePressed,
}

/// Outcome of a completed render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames presented, including the one on which the loop ended
    pub frames: u64,
    pub exit: ExitReason,
}

/// Owns one camera and the overlays replayed onto each of its frames
pub struct CaptureSession<C: CaptureDevice> {
    device: C,
    scale: f64,
    show_info: bool,
    overlays: Overlays,
    painter: Painter,
    window_title: String,
    key_poll_ms: i32,
    state: SessionState,
}

impl<C: CaptureDevice> CaptureSession<C> {
    /// Create a session around an opened device.
    ///
    /// Text is rendered with the first system font found, or the bundled
    /// one. Fails with `DeviceUnavailable` if the device is not open, and
    /// with `Config` if `scale` is not a positive percentage.
    pub fn new(device: C, scale: f64, show_info: bool) -> Result<Self, SessionError> {
        Self::open(device, scale, show_info, None)
    }

    /// Create a session from configuration, registering its initial overlays
    pub fn from_config(config: &SessionConfig, device: C) -> Result<Self, SessionError> {
        config.validate()?;
        let mut session = Self::open(
            device,
            config.scale,
            config.show_info,
            config.font_path.as_deref(),
        )?
        .with_window_title(config.window_title.clone())
        .with_key_poll_ms(config.key_poll_ms);

        for rect in &config.rectangles {
            let color = rect.color.resolve()?;
            session.add_rectangle_with_thickness(
                rect.top_left.into(),
                rect.bottom_right.into(),
                color,
                rect.thickness,
            );
        }
        for label in &config.texts {
            let color = label.color.resolve()?;
            session.add_text_with_thickness(
                label.text.clone(),
                label.anchor.into(),
                label.font_size,
                color,
                label.thickness,
            );
        }
        Ok(session)
    }

    fn open(
        device: C,
        scale: f64,
        show_info: bool,
        font_path: Option<&Path>,
    ) -> Result<Self, SessionError> {
        validate_scale(scale)?;
        if !device.is_opened() {
            return Err(SessionError::DeviceUnavailable(
                "camera did not open".to_string(),
            ));
        }
        let painter = Painter::load(font_path)?;

        info!("Opened capture session (scale={}, show_info={})", scale, show_info);

        Ok(Self {
            device,
            scale,
            show_info,
            overlays: Overlays::new(),
            painter,
            window_title: "Webcam".to_string(),
            key_poll_ms: 1,
            state: SessionState::Open,
        })
    }

    pub fn with_painter(mut self, painter: Painter) -> Self {
        self.painter = painter;
        self
    }

    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn with_key_poll_ms(mut self, delay_ms: i32) -> Self {
        self.key_poll_ms = delay_ms.max(1);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn show_info(&self) -> bool {
        self.show_info
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn device(&self) -> &C {
        &self.device
    }

    /// Register a rectangle outline with the default thickness
    pub fn add_rectangle(&mut self, top_left: Point, bottom_right: Point, color: Color) -> u32 {
        self.add_rectangle_with_thickness(top_left, bottom_right, color, DEFAULT_THICKNESS)
    }

    pub fn add_rectangle_with_thickness(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: Color,
        thickness: i32,
    ) -> u32 {
        let key = self
            .overlays
            .add_rectangle(top_left, bottom_right, color, thickness);
        debug!("Added rectangle #{} {:?}-{:?}", key, top_left, bottom_right);
        key
    }

    /// Register a text label with the default thickness
    pub fn add_text(
        &mut self,
        text: impl Into<String>,
        anchor: Point,
        font_size: f32,
        color: Color,
    ) -> u32 {
        self.add_text_with_thickness(text, anchor, font_size, color, DEFAULT_THICKNESS)
    }

    pub fn add_text_with_thickness(
        &mut self,
        text: impl Into<String>,
        anchor: Point,
        font_size: f32,
        color: Color,
        thickness: i32,
    ) -> u32 {
        let key = self
            .overlays
            .add_text(text, anchor, font_size, color, thickness);
        debug!("Added text #{} at {:?}", key, anchor);
        key
    }

    /// Display size for the given native properties
    pub fn target_dimensions(&self, props: &CaptureProperties) -> (u32, u32) {
        target_dimensions(props.width, props.height, self.scale)
    }

    /// Per-frame draw list: user rectangles, user texts, then diagnostics
    pub fn compose(&self, props: &CaptureProperties) -> Vec<Annotation> {
        let mut list = self.overlays.draw_list();
        if self.show_info {
            let target = self.target_dimensions(props);
            list.extend(
                diagnostic_labels(target, props.fps)
                    .into_iter()
                    .map(Annotation::Text),
            );
        }
        list
    }

    /// Draw overlays onto a native frame, then rescale it for display
    pub fn render(&self, mut frame: VideoFrame, props: &CaptureProperties) -> VideoFrame {
        let annotations = self.compose(props);
        self.painter.paint(&mut frame, &annotations);

        if self.scale == NATIVE_SCALE {
            return frame;
        }
        let (width, height) = self.target_dimensions(props);
        frame.resize_area(width.max(1), height.max(1))
    }

    /// Run the blocking render loop until escape or a capture failure
    pub fn run(&mut self, display: &mut dyn DisplaySurface) -> Result<RunSummary, SessionError> {
        self.run_with(display, |_, _| {})
    }

    /// Like `run`, calling `hook` with the overlays and frame index before
    /// each frame is drawn.
    ///
    /// The device is released and the display destroyed on every exit path.
    pub fn run_with<F>(
        &mut self,
        display: &mut dyn DisplaySurface,
        mut hook: F,
    ) -> Result<RunSummary, SessionError>
    where
        F: FnMut(&mut Overlays, u64),
    {
        if self.state == SessionState::Closed || !self.device.is_opened() {
            self.shutdown(display);
            return Err(SessionError::DeviceUnavailable(
                "camera not found".to_string(),
            ));
        }

        self.state = SessionState::Running;
        info!("Starting capture loop in window {:?}", self.window_title);

        let outcome = self.capture_loop(display, &mut hook);
        self.shutdown(display);

        match &outcome {
            Ok(summary) => info!("Capture loop ended after {} frames", summary.frames),
            Err(e) => error!("Capture loop aborted: {}", e),
        }
        outcome
    }

    fn capture_loop<F>(
        &mut self,
        display: &mut dyn DisplaySurface,
        hook: &mut F,
    ) -> Result<RunSummary, SessionError>
    where
        F: FnMut(&mut Overlays, u64),
    {
        let mut frames = 0u64;
        loop {
            hook(&mut self.overlays, frames);

            let frame = self
                .device
                .read_frame()
                .map_err(|e| SessionError::FrameCapture(e.to_string()))?;
            let props = self
                .device
                .properties()
                .map_err(|e| SessionError::FrameCapture(e.to_string()))?;

            let output = self.render(frame, &props);
            display.show(&self.window_title, &output)?;
            frames += 1;

            match display.poll_key(self.key_poll_ms)? {
                Some(ESCAPE_KEY) => {
                    return Ok(RunSummary {
                        frames,
                        exit: ExitReason::EscapePressed,
                    })
                }
                Some(key) => debug!("Ignoring key {}", key),
                None => {}
            }
        }
    }

    fn shutdown(&mut self, display: &mut dyn DisplaySurface) {
        self.device.release();
        if let Err(e) = display.destroy() {
            warn!("Display teardown failed: {}", e);
        }
        self.state = SessionState::Closed;
    }
}

impl<C: CaptureDevice> fmt::Display for CaptureSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CaptureSession(scale={}, show_info={})",
            self.scale, self.show_info
        )?;
        writeln!(f, "#Rectangles:{}", self.overlays.rectangles.len())?;
        write!(f, "#Texts:{}", self.overlays.texts.len())
    }
}

impl<C: CaptureDevice> fmt::Debug for CaptureSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("scale", &self.scale)
            .field("show_info", &self.show_info)
            .field("state", &self.state)
            .field("rectangles", &self.overlays.rectangles.len())
            .field("texts", &self.overlays.texts.len())
            .finish()
    }
}
