//! Frame sources.
//!
//! A [`FrameSource`] owns the live media stream: device acquisition with
//! ideal (not guaranteed) constraints, successive decoded frames, and
//! track release. Platform camera backends implement this trait; the
//! built-in [`SyntheticSource`] generates a test pattern for headless
//! runs and tests.

use async_trait::async_trait;

use vigilanteye_common::{CameraSettings, DeviceError, FacingMode};
use vigilanteye_detection_core::FrameBuffer;

/// Capture constraints. Every field is a hint: the device may negotiate
/// a different format, and callers must read back the actual
/// [`StreamFormat`] rather than assuming the request was honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub facing_mode: FacingMode,
}

impl From<CameraSettings> for StreamRequest {
    fn from(settings: CameraSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
            facing_mode: settings.facing_mode,
        }
    }
}

/// The format the device actually negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl StreamFormat {
    /// Resolution as the `"<width>x<height>"` display form.
    pub fn resolution_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// A live camera stream.
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Resolves once with either the negotiated
    /// format or a classified [`DeviceError`]; acquisition failures are
    /// terminal for the attempt and are never retried here.
    async fn open(&mut self, request: &StreamRequest) -> Result<StreamFormat, DeviceError>;

    /// The next decoded frame, or `None` when no frame is available this
    /// tick (stream still warming up, or closed).
    fn next_frame(&mut self) -> Option<FrameBuffer>;

    /// Release all device tracks. Idempotent.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Deterministic test-pattern source.
///
/// Renders a mid-gray scene with a bright block that advances one step
/// per frame (guaranteed inter-frame motion) and an optional dark band
/// for the object heuristic to find. Negotiation clamps the requested
/// resolution to the configured sensor maximum, mimicking a device that
/// does not honor ideal constraints exactly.
pub struct SyntheticSource {
    max_width: u32,
    max_height: u32,
    fail_with: Option<DeviceError>,
    dark_band_rows: u32,
    format: Option<StreamFormat>,
    tick: u64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            fail_with: None,
            dark_band_rows: 0,
            format: None,
            tick: 0,
        }
    }

    /// Limit the sensor resolution; larger requests negotiate down.
    pub fn with_max_resolution(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Make every `open` fail with the given device error.
    pub fn failing_with(mut self, error: DeviceError) -> Self {
        self.fail_with = Some(error);
        self
    }

    /// Render `rows` dark rows at the bottom of every frame.
    pub fn with_dark_band(mut self, rows: u32) -> Self {
        self.dark_band_rows = rows;
        self
    }

    /// Frames delivered so far.
    pub fn frames_delivered(&self) -> u64 {
        self.tick
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    async fn open(&mut self, request: &StreamRequest) -> Result<StreamFormat, DeviceError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }

        let format = StreamFormat {
            width: request.width.min(self.max_width),
            height: request.height.min(self.max_height),
            fps: request.fps,
        };
        self.format = Some(format);
        self.tick = 0;
        Ok(format)
    }

    fn next_frame(&mut self) -> Option<FrameBuffer> {
        let format = self.format?;
        let mut frame = FrameBuffer::filled(format.width, format.height, [128, 128, 128, 255]);

        // Bright 8x8 block stepping right one pixel per frame.
        let block_x = (self.tick % u64::from(format.width.max(1))) as u32;
        for dy in 0..8u32.min(format.height) {
            for dx in 0..8u32 {
                frame.put_pixel((block_x + dx) % format.width.max(1), dy, [255, 255, 255, 255]);
            }
        }

        if self.dark_band_rows > 0 {
            let start = format.height.saturating_sub(self.dark_band_rows);
            for y in start..format.height {
                for x in 0..format.width {
                    frame.put_pixel(x, y, [20, 20, 20, 255]);
                }
            }
        }

        self.tick += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.format = None;
    }

    fn is_open(&self) -> bool {
        self.format.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StreamRequest {
        StreamRequest {
            width: 1280,
            height: 720,
            fps: 30,
            facing_mode: FacingMode::User,
        }
    }

    #[tokio::test]
    async fn open_negotiates_down_to_sensor_maximum() {
        let mut source = SyntheticSource::new().with_max_resolution(640, 480);
        let format = source.open(&request()).await.unwrap();
        assert_eq!((format.width, format.height), (640, 480));
        assert_eq!(format.fps, 30);
        assert!(source.is_open());
    }

    #[tokio::test]
    async fn open_failure_is_classified() {
        let mut source = SyntheticSource::new().failing_with(DeviceError::Busy);
        let err = source.open(&request()).await.unwrap_err();
        assert_eq!(err, DeviceError::Busy);
        assert!(!source.is_open());
    }

    #[tokio::test]
    async fn consecutive_frames_differ() {
        let mut source = SyntheticSource::new().with_max_resolution(64, 48);
        source.open(&request()).await.unwrap();
        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(source.frames_delivered(), 2);
    }

    #[tokio::test]
    async fn closed_source_yields_no_frames() {
        let mut source = SyntheticSource::new();
        source.open(&request()).await.unwrap();
        source.close();
        assert!(source.next_frame().is_none());
        // Closing again is fine.
        source.close();
    }
}
