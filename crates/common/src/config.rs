//! Camera settings and logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::KeyValueStore;

/// Storage key for the persisted resolution (`"<width>x<height>"`).
pub const RESOLUTION_KEY: &str = "camera_resolution";
/// Storage key for the persisted target frame rate (integer string).
pub const FPS_KEY: &str = "camera_fps";
/// Storage key for the persisted facing mode.
pub const FACING_MODE_KEY: &str = "camera_facing_mode";

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const DEFAULT_FPS: u32 = 30;

/// Which camera the capture request prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera.
    #[default]
    User,
    /// Rear-facing camera.
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }

    /// Parse a persisted facing-mode string; unknown values fall back to
    /// the default.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "environment" => Self::Environment,
            _ => Self::User,
        }
    }
}

/// Camera settings in effect when a capture starts.
///
/// Persisted as three independent string-keyed values; any missing or
/// unparseable key falls back to its documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Requested capture width (ideal, not guaranteed).
    pub width: u32,

    /// Requested capture height (ideal, not guaranteed).
    pub height: u32,

    /// Requested frame rate (ideal, not guaranteed).
    pub fps: u32,

    /// Preferred camera.
    pub facing_mode: FacingMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            facing_mode: FacingMode::default(),
        }
    }
}

impl CameraSettings {
    /// Load settings from the storage boundary, falling back to defaults
    /// for anything missing or unparseable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let (width, height) = store
            .get(RESOLUTION_KEY)
            .and_then(|value| parse_resolution(&value))
            .unwrap_or((defaults.width, defaults.height));

        let fps = store
            .get(FPS_KEY)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(defaults.fps);

        let facing_mode = store
            .get(FACING_MODE_KEY)
            .map(|value| FacingMode::parse_or_default(value.trim()))
            .unwrap_or(defaults.facing_mode);

        Self {
            width,
            height,
            fps,
            facing_mode,
        }
    }

    /// Write settings through the storage boundary.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> crate::error::VigilResult<()> {
        store.set(RESOLUTION_KEY, &self.resolution_label())?;
        store.set(FPS_KEY, &self.fps.to_string())?;
        store.set(FACING_MODE_KEY, self.facing_mode.as_str())?;
        Ok(())
    }

    /// Resolution as the persisted `"<width>x<height>"` form.
    pub fn resolution_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Parse a `"<width>x<height>"` string.
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once('x')?;
    let width = w.parse::<u32>().ok()?;
    let height = h.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vigilanteye=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let store = MemoryStore::new();
        let settings = CameraSettings::load(&store);
        assert_eq!(settings.width, 1280);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.fps, 30);
        assert_eq!(settings.facing_mode, FacingMode::User);
    }

    #[test]
    fn settings_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let settings = CameraSettings {
            width: 1920,
            height: 1080,
            fps: 60,
            facing_mode: FacingMode::Environment,
        };
        settings.save(&mut store).unwrap();

        assert_eq!(store.get(RESOLUTION_KEY).as_deref(), Some("1920x1080"));
        assert_eq!(store.get(FPS_KEY).as_deref(), Some("60"));
        assert_eq!(store.get(FACING_MODE_KEY).as_deref(), Some("environment"));
        assert_eq!(CameraSettings::load(&store), settings);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(RESOLUTION_KEY, "garbage").unwrap();
        store.set(FPS_KEY, "not-a-number").unwrap();
        store.set(FACING_MODE_KEY, "sideways").unwrap();

        let settings = CameraSettings::load(&store);
        assert_eq!(settings, CameraSettings::default());
    }

    #[test]
    fn resolution_parsing() {
        assert_eq!(parse_resolution("1280x720"), Some((1280, 720)));
        assert_eq!(parse_resolution(" 640x480 "), Some((640, 480)));
        assert_eq!(parse_resolution("0x720"), None);
        assert_eq!(parse_resolution("1280"), None);
        assert_eq!(parse_resolution("axb"), None);
    }
}
