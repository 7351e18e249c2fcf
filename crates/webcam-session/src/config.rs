//! Session configuration

use std::path::{Path, PathBuf};

use camera_capture::CameraConfig;
use overlay::{ColorSpec, DEFAULT_THICKNESS};
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Config file read when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "webcam.toml";

/// Environment variable prefix (`WEBCAM_SCALE`, `WEBCAM_CAMERA__DEVICE_INDEX`, ...)
pub const ENV_PREFIX: &str = "WEBCAM";

/// Capture session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display size as a percentage of the native resolution
    pub scale: f64,

    /// Draw width, height and FPS in the top-right corner
    pub show_info: bool,

    /// Title of the display window
    pub window_title: String,

    /// Key poll timeout per frame (milliseconds)
    pub key_poll_ms: i32,

    /// TrueType font for text overlays; system fonts are probed when unset
    pub font_path: Option<PathBuf>,

    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    pub camera: CameraConfig,

    pub headless: HeadlessConfig,

    /// Rectangles registered before capture starts
    pub rectangles: Vec<RectangleSpec>,

    /// Text labels registered before capture starts
    pub texts: Vec<TextSpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scale: 100.0,
            show_info: false,
            window_title: "Webcam".to_string(),
            key_poll_ms: 1,
            font_path: None,
            log_level: "info".to_string(),
            log_json: false,
            camera: CameraConfig::default(),
            headless: HeadlessConfig::default(),
            rectangles: Vec::new(),
            texts: Vec::new(),
        }
    }
}

/// Settings for the window-less display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Press escape automatically after this many frames
    pub escape_after: Option<u64>,
    /// PNG written with the last frame when the session ends
    pub snapshot_path: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            escape_after: Some(300),
            snapshot_path: None,
        }
    }
}

fn default_thickness() -> i32 {
    DEFAULT_THICKNESS
}

/// Rectangle overlay from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleSpec {
    pub top_left: [i32; 2],
    pub bottom_right: [i32; 2],
    pub color: ColorSpec,
    #[serde(default = "default_thickness")]
    pub thickness: i32,
}

/// Text overlay from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    pub text: String,
    pub anchor: [i32; 2],
    pub font_size: f32,
    pub color: ColorSpec,
    #[serde(default = "default_thickness")]
    pub thickness: i32,
}

impl SessionConfig {
    /// Load from a TOML file (optional) overlaid with `WEBCAM_*` variables
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        Self::from_settings(settings)
    }

    /// Parse TOML text, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, SessionError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self, SessionError> {
        let config: SessionConfig = settings
            .try_deserialize()
            .map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        validate_scale(self.scale)?;
        if self.key_poll_ms <= 0 {
            return Err(SessionError::Config(format!(
                "key_poll_ms must be positive, got {}",
                self.key_poll_ms
            )));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(SessionError::Config(format!(
                "unknown log level {:?}",
                self.log_level
            )));
        }
        Ok(())
    }
}

/// Scale must be a positive, finite percentage
pub fn validate_scale(scale: f64) -> Result<(), SessionError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(SessionError::Config(format!(
            "scale must be a positive percentage, got {}",
            scale
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.scale, 100.0);
        assert!(!config.show_info);
        assert_eq!(config.window_title, "Webcam");
        assert_eq!(config.camera.device_index, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overlays() {
        let config = SessionConfig::from_toml_str(
            r#"
            scale = 50
            show_info = true

            [camera]
            width = 320
            height = 240

            [[rectangles]]
            top_left = [10, 10]
            bottom_right = [100, 100]
            color = "red"

            [[texts]]
            text = "hello"
            anchor = [20, 40]
            font_size = 1.0
            color = [0, 255, 0]
            thickness = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.scale, 50.0);
        assert!(config.show_info);
        assert_eq!(config.camera.width, 320);
        assert_eq!(config.camera.fps, 30.0);
        assert_eq!(config.rectangles.len(), 1);
        assert_eq!(config.rectangles[0].thickness, DEFAULT_THICKNESS);
        assert_eq!(config.rectangles[0].color, ColorSpec::Named("red".into()));
        assert_eq!(config.texts[0].color, ColorSpec::Rgb([0, 255, 0]));
        assert_eq!(config.texts[0].thickness, 1);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(SessionConfig::from_toml_str("scale = 0").is_err());
        assert!(SessionConfig::from_toml_str("scale = -20").is_err());
        assert!(validate_scale(f64::NAN).is_err());
        assert!(validate_scale(12.5).is_ok());
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let err = SessionConfig::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn test_demo_config_parses() {
        let config = SessionConfig::from_toml_str(include_str!("../../../demos/webcam.toml")).unwrap();
        assert_eq!(config.scale, 50.0);
        assert_eq!(config.headless.escape_after, Some(120));
        assert_eq!(config.rectangles.len(), 1);
        assert_eq!(config.texts[0].color, ColorSpec::Rgb([0, 255, 255]));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = SessionConfig::load(Path::new("/nonexistent/webcam.toml")).unwrap();
        assert_eq!(config.window_title, "Webcam");
    }
}
