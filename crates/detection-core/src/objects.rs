//! Object-count estimation by dark-pixel density.
//!
//! Counts pixels with any low-intensity color channel as "edge" pixels
//! and derives an approximate object count from their density. A fixed,
//! non-discriminating confidence is attached to every synthetic object.
//! This stands in for real object recognition and its formula is part of
//! the behavioral contract; do not substitute a trained detector.

use serde::Serialize;

use crate::frame::{FrameBuffer, BYTES_PER_PIXEL};

/// Channel value below which a pixel counts as dark.
pub const DARK_CHANNEL_CUTOFF: u8 = 100;

/// Dark pixels per estimated object.
pub const PIXELS_PER_OBJECT: u64 = 1000;

/// Confidence attached to every synthetic object.
pub const OBJECT_CONFIDENCE: f64 = 0.7;

/// One synthetic object record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedObject {
    pub id: usize,
    pub kind: &'static str,
    pub confidence: f64,
}

/// Result of one object-density pass over a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectReport {
    pub dark_pixels: u64,
    pub objects: Vec<DetectedObject>,
}

impl ObjectReport {
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Stateless dark-pixel density heuristic.
#[derive(Debug, Default)]
pub struct ObjectHeuristic;

impl ObjectHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the object count for one frame:
    /// `floor(dark_pixels / 1000)` synthetic objects at confidence 0.7.
    pub fn analyze(&self, frame: &FrameBuffer) -> ObjectReport {
        let mut dark_pixels = 0u64;

        for pixel in frame.data().chunks_exact(BYTES_PER_PIXEL) {
            if pixel[0] < DARK_CHANNEL_CUTOFF
                || pixel[1] < DARK_CHANNEL_CUTOFF
                || pixel[2] < DARK_CHANNEL_CUTOFF
            {
                dark_pixels += 1;
            }
        }

        let count = (dark_pixels / PIXELS_PER_OBJECT) as usize;
        let objects = (0..count)
            .map(|id| DetectedObject {
                id,
                kind: "object",
                confidence: OBJECT_CONFIDENCE,
            })
            .collect();

        ObjectReport {
            dark_pixels,
            objects,
        }
    }
}
