//! Clock and timing utilities for capture sessions.
//!
//! A monitoring session is anchored to a monotonic epoch recorded at the
//! moment the camera connects. This module provides:
//! - The session clock (monotonic elapsed time plus a wall-clock anchor)
//! - FPS accounting with one-second read-and-reset sampling
//! - Frame-loop pacing

use std::time::{Duration, Instant};

/// A session clock that provides monotonic timestamps relative to a
/// fixed epoch (the moment the camera connected).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch.
    epoch_wall: chrono::DateTime<chrono::Utc>,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now(),
        }
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Whole seconds elapsed since session start.
    pub fn elapsed_whole_secs(&self) -> u64 {
        self.epoch.elapsed().as_secs()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> chrono::DateTime<chrono::Utc> {
        self.epoch_wall
    }

    /// Elapsed time as an `MM:SS` label for status displays.
    pub fn elapsed_label(&self) -> String {
        let elapsed = self.elapsed_whole_secs();
        format!("{:02}:{:02}", elapsed / 60, elapsed % 60)
    }
}

/// Frames-per-second accounting.
///
/// The counter increments once per drawn frame; a one-second reporter
/// calls [`FpsCounter::sample`], which reads and resets it. The sampled
/// value is "frames drawn in the last wall-clock second", not an
/// instantaneous rate.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one drawn frame.
    pub fn tick(&mut self) {
        self.frames += 1;
    }

    /// Read the frame count accumulated since the last sample and reset it.
    pub fn sample(&mut self) -> u32 {
        std::mem::take(&mut self.frames)
    }

    /// Discard any accumulated count.
    pub fn reset(&mut self) {
        self.frames = 0;
    }
}

/// Paces the cooperative frame loop at a display-style refresh rate.
#[derive(Debug, Clone, Copy)]
pub struct FrameTicker {
    interval: Duration,
}

impl FrameTicker {
    /// Create a ticker targeting the given Hz rate. Rates of zero clamp to 1.
    pub fn new(target_hz: u32) -> Self {
        Self {
            interval: Duration::from_nanos(1_000_000_000 / u64::from(target_hz.max(1))),
        }
    }

    /// Interval between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed_is_small_at_start() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert_eq!(clock.elapsed_label(), "00:00");
    }

    #[test]
    fn test_fps_counter_read_and_reset() {
        let mut fps = FpsCounter::new();
        for _ in 0..29 {
            fps.tick();
        }
        assert_eq!(fps.sample(), 29);
        // Sampling resets the window.
        assert_eq!(fps.sample(), 0);
    }

    #[test]
    fn test_frame_ticker_interval() {
        let ticker = FrameTicker::new(60);
        let nanos = ticker.interval().as_nanos();
        assert!(nanos > 16_000_000 && nanos < 17_000_000);

        // Degenerate rate clamps instead of dividing by zero.
        assert_eq!(FrameTicker::new(0).interval(), Duration::from_secs(1));
    }
}
