//! Motion detection by consecutive-frame differencing.
//!
//! Each frame is compared pixel-for-pixel against the previous one; a
//! pixel counts as changed when any color channel differs by more than
//! `sensitivity * 255`. The verdict trips when the changed-pixel count
//! exceeds a small fixed threshold.

use crate::frame::{FrameBuffer, BYTES_PER_PIXEL};

/// Default sensitivity on the `[0, 1]` scale.
pub const DEFAULT_SENSITIVITY: f64 = 0.3;

/// Changed pixels needed to trip the verdict. Deliberately tiny: a
/// handful of changed pixels out of a full frame counts as motion.
pub const MOTION_THRESHOLD: u64 = 10;

/// Divisor mapping a changed-pixel count onto the `[0, 1]` confidence
/// scale before clamping.
pub const CONFIDENCE_SCALE: f64 = 1000.0;

/// Outcome of comparing one frame against its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionVerdict {
    pub motion_detected: bool,
    pub motion_pixels: u64,
}

impl MotionVerdict {
    const NO_MOTION: Self = Self {
        motion_detected: false,
        motion_pixels: 0,
    };

    /// Clamped linear confidence: `min(motion_pixels / 1000, 1)`. Not a
    /// calibrated probability.
    pub fn confidence(&self) -> f64 {
        (self.motion_pixels as f64 / CONFIDENCE_SCALE).min(1.0)
    }
}

/// Stateful motion detector holding exactly one previous-frame buffer.
///
/// The buffer is cleared whenever detection is (re)enabled, so the first
/// frame after a reset only seeds the comparison. A frame whose geometry
/// differs from the stored buffer re-seeds it the same way rather than
/// comparing stale pixels.
#[derive(Debug)]
pub struct MotionDetector {
    sensitivity: f64,
    last_frame: Option<FrameBuffer>,
}

impl MotionDetector {
    pub fn new() -> Self {
        Self::with_sensitivity(DEFAULT_SENSITIVITY)
    }

    pub fn with_sensitivity(sensitivity: f64) -> Self {
        Self {
            sensitivity: sensitivity.clamp(0.0, 1.0),
            last_frame: None,
        }
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Adjust the sensitivity. Takes effect on the next comparison; the
    /// stored frame is kept.
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity.clamp(0.0, 1.0);
    }

    /// Discard the stored frame. Called when detection is toggled so a
    /// re-enable never compares against stale geometry.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// Compare `frame` against the stored predecessor and replace it.
    ///
    /// The first call after a reset (and any call where the frame
    /// geometry changed) stores the frame and reports no motion.
    pub fn process(&mut self, frame: &FrameBuffer) -> MotionVerdict {
        let Some(last) = &self.last_frame else {
            self.last_frame = Some(frame.clone());
            return MotionVerdict::NO_MOTION;
        };

        if last.width() != frame.width() || last.height() != frame.height() {
            tracing::debug!(
                from = %format!("{}x{}", last.width(), last.height()),
                to = %format!("{}x{}", frame.width(), frame.height()),
                "Frame geometry changed, re-seeding motion buffer"
            );
            self.last_frame = Some(frame.clone());
            return MotionVerdict::NO_MOTION;
        }

        let threshold = self.sensitivity * 255.0;
        let mut motion_pixels = 0u64;

        for (current, previous) in frame
            .data()
            .chunks_exact(BYTES_PER_PIXEL)
            .zip(last.data().chunks_exact(BYTES_PER_PIXEL))
        {
            let r = current[0].abs_diff(previous[0]);
            let g = current[1].abs_diff(previous[1]);
            let b = current[2].abs_diff(previous[2]);
            // Alpha is ignored.
            if f64::from(r) > threshold || f64::from(g) > threshold || f64::from(b) > threshold {
                motion_pixels += 1;
            }
        }

        self.last_frame = Some(frame.clone());

        MotionVerdict {
            motion_detected: motion_pixels > MOTION_THRESHOLD,
            motion_pixels,
        }
    }

    /// Whether a comparison frame is currently stored.
    pub fn has_history(&self) -> bool {
        self.last_frame.is_some()
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// A frame differing from `base` in `count` pixels, each channel
    /// flipped by the full 255.
    fn flip_pixels(base: &FrameBuffer, count: u32) -> FrameBuffer {
        let mut frame = base.clone();
        for i in 0..count {
            frame.put_pixel(i % frame.width(), i / frame.width(), [255, 255, 255, 255]);
        }
        frame
    }

    #[test]
    fn first_frame_after_reset_reports_no_motion() {
        let mut detector = MotionDetector::new();
        let frame = FrameBuffer::filled(64, 48, [200, 200, 200, 255]);

        let verdict = detector.process(&frame);
        assert!(!verdict.motion_detected);
        assert_eq!(verdict.motion_pixels, 0);
        assert!(detector.has_history());

        detector.reset();
        assert!(!detector.has_history());
        assert!(!detector.process(&frame).motion_detected);
    }

    #[test]
    fn five_changed_pixels_stay_under_the_threshold() {
        let mut detector = MotionDetector::with_sensitivity(0.3);
        let base = FrameBuffer::filled(64, 48, [0, 0, 0, 255]);
        detector.process(&base);

        let verdict = detector.process(&flip_pixels(&base, 5));
        assert_eq!(verdict.motion_pixels, 5);
        assert!(!verdict.motion_detected);
    }

    #[test]
    fn eleven_changed_pixels_trip_the_threshold() {
        let mut detector = MotionDetector::with_sensitivity(0.3);
        let base = FrameBuffer::filled(64, 48, [0, 0, 0, 255]);
        detector.process(&base);

        let verdict = detector.process(&flip_pixels(&base, 11));
        assert_eq!(verdict.motion_pixels, 11);
        assert!(verdict.motion_detected);
        assert!((verdict.confidence() - 0.011).abs() < 1e-12);
    }

    #[test]
    fn exactly_threshold_pixels_is_not_motion() {
        let mut detector = MotionDetector::new();
        let base = FrameBuffer::filled(64, 48, [0, 0, 0, 255]);
        detector.process(&base);

        let verdict = detector.process(&flip_pixels(&base, MOTION_THRESHOLD as u32));
        assert_eq!(verdict.motion_pixels, MOTION_THRESHOLD);
        assert!(!verdict.motion_detected);
    }

    #[test]
    fn alpha_changes_are_ignored() {
        let mut detector = MotionDetector::new();
        detector.process(&FrameBuffer::filled(8, 8, [50, 50, 50, 255]));
        let verdict = detector.process(&FrameBuffer::filled(8, 8, [50, 50, 50, 0]));
        assert_eq!(verdict.motion_pixels, 0);
    }

    #[test]
    fn geometry_change_reseeds_instead_of_comparing() {
        let mut detector = MotionDetector::new();
        detector.process(&FrameBuffer::filled(64, 48, [0, 0, 0, 255]));

        let resized = FrameBuffer::filled(32, 24, [255, 255, 255, 255]);
        assert!(!detector.process(&resized).motion_detected);
        // The resized frame became the new comparison base.
        assert!(detector.process(&resized).motion_pixels == 0);
    }

    #[test]
    fn last_frame_is_replaced_every_call() {
        let mut detector = MotionDetector::new();
        let black = FrameBuffer::filled(16, 16, [0, 0, 0, 255]);
        let white = FrameBuffer::filled(16, 16, [255, 255, 255, 255]);

        detector.process(&black);
        assert!(detector.process(&white).motion_detected);
        // No exponential smoothing: white vs white is clean.
        assert_eq!(detector.process(&white).motion_pixels, 0);
    }

    #[test]
    fn confidence_clamps_at_one() {
        let verdict = MotionVerdict {
            motion_detected: true,
            motion_pixels: 50_000,
        };
        assert_eq!(verdict.confidence(), 1.0);
    }

    proptest! {
        /// Identical consecutive frames never report motion, at any
        /// sensitivity.
        #[test]
        fn identical_frames_never_report_motion(
            sensitivity in 0.0f64..=1.0,
            r in 0u8..=255,
            g in 0u8..=255,
            b in 0u8..=255,
        ) {
            let mut detector = MotionDetector::with_sensitivity(sensitivity);
            let frame = FrameBuffer::filled(32, 32, [r, g, b, 255]);
            detector.process(&frame);
            let verdict = detector.process(&frame);
            prop_assert!(!verdict.motion_detected);
            prop_assert_eq!(verdict.motion_pixels, 0);
        }

        /// The first frame after a reset stores history and reports no
        /// motion regardless of content.
        #[test]
        fn first_frame_is_always_quiet(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let mut detector = MotionDetector::new();
            let verdict = detector.process(&FrameBuffer::filled(16, 16, [r, g, b, 255]));
            prop_assert!(!verdict.motion_detected);
            prop_assert!(detector.has_history());
        }
    }
}
