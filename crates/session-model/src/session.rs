//! Session data contracts.
//!
//! A session records one continuous camera-active interval. Child records
//! (recordings, screenshots, motion events) are appended in order while
//! the session is active; a session is never mutated after completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigilanteye_common::FacingMode;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Lifecycle state of a recording within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Recording,
    Stopped,
}

/// Camera settings snapshot captured when a session opens.
///
/// The resolution here is the *actual* negotiated resolution, not the
/// requested one. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Negotiated resolution as `"<width>x<height>"`.
    pub resolution: String,

    /// Target frame rate in effect.
    pub fps: u32,

    /// Facing mode in effect.
    pub facing_mode: FacingMode,
}

impl SettingsSnapshot {
    pub fn new(resolution: impl Into<String>, fps: u32, facing_mode: FacingMode) -> Self {
        Self {
            resolution: resolution.into(),
            fps,
            facing_mode,
        }
    }

    /// Settings as the history display line, e.g. `"1280x720 @ 30fps"`.
    pub fn label(&self) -> String {
        format!("{} @ {}fps", self.resolution, self.fps)
    }
}

/// One recording produced during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub duration_secs: u64,
    pub status: RecordingStatus,
}

impl Recording {
    /// A recording that has just started.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            id: format!("rec_{}", now.timestamp_millis()),
            start_time: now,
            duration_secs: 0,
            status: RecordingStatus::Recording,
        }
    }
}

/// One screenshot produced during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub filename: String,
}

impl Screenshot {
    pub fn captured(now: DateTime<Utc>, filename: impl Into<String>) -> Self {
        Self {
            id: format!("screenshot_{}", now.timestamp_millis()),
            timestamp: now,
            filename: filename.into(),
        }
    }
}

/// One positive motion verdict recorded during a session.
///
/// `confidence` is `min(motion_pixels / 1000, 1)`, a clamped linear
/// scale rather than a calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub timestamp: DateTime<Utc>,
    pub motion_pixels: u64,
    pub confidence: f64,
}

impl MotionEvent {
    pub fn new(timestamp: DateTime<Utc>, motion_pixels: u64) -> Self {
        Self {
            timestamp,
            motion_pixels,
            confidence: (motion_pixels as f64 / 1000.0).min(1.0),
        }
    }
}

/// The record of one continuous camera-active interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique token generated at session start.
    pub id: String,

    pub start_time: DateTime<Utc>,

    /// Set when the session closes; `None` while active.
    pub end_time: Option<DateTime<Utc>>,

    /// Whole seconds between start and end; set only on close.
    pub duration_secs: Option<u64>,

    /// Settings in effect when the session opened.
    pub settings: SettingsSnapshot,

    pub status: SessionStatus,

    pub recordings: Vec<Recording>,
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub motion_events: Vec<MotionEvent>,
}

impl Session {
    /// Open a new active session.
    pub fn open(settings: SettingsSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_session_id(now),
            start_time: now,
            end_time: None,
            duration_secs: None,
            settings,
            status: SessionStatus::Active,
            recordings: Vec::new(),
            screenshots: Vec::new(),
            motion_events: Vec::new(),
        }
    }

    /// Close the session: record the end time, derive the duration, and
    /// flip the status to completed.
    pub fn close(&mut self, now: DateTime<Utc>) {
        let elapsed = (now - self.start_time).num_seconds().max(0) as u64;
        self.end_time = Some(now);
        self.duration_secs = Some(elapsed);
        self.status = SessionStatus::Completed;
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Boundary-facing summary of this session.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            start_time: self.start_time,
            recording_count: self.recordings.len(),
            screenshot_count: self.screenshots.len(),
            motion_event_count: self.motion_events.len(),
            duration_label: match self.duration_secs {
                Some(secs) => format_duration(secs),
                None => "Active".to_string(),
            },
            settings_label: self.settings.label(),
            status: self.status,
        }
    }
}

/// Per-session summary pushed to the boundary (history display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub recording_count: usize,
    pub screenshot_count: usize,
    pub motion_event_count: usize,
    pub duration_label: String,
    pub settings_label: String,
    pub status: SessionStatus,
}

/// Generate a session id: millisecond timestamp plus a short random
/// suffix so two sessions opened within the same millisecond cannot
/// collide.
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    format!("session_{}_{}", now.timestamp_millis(), id_suffix())
}

/// Nine base36 characters derived from the nanosecond clock and a
/// process-local counter (distinct even when the clock does not move).
fn id_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut seed = nanos
        .wrapping_add(u128::from(COUNTER.fetch_add(1, Ordering::Relaxed)) << 64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let alphabet = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut suffix = String::with_capacity(9);
    for _ in 0..9 {
        suffix.push(alphabet[(seed % 36) as usize] as char);
        seed /= 36;
    }
    suffix
}

/// Format a duration in seconds as `"Nh Nm Ns"`, `"Nm Ns"`, or `"Ns"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SettingsSnapshot {
        SettingsSnapshot::new("1280x720", 30, FacingMode::User)
    }

    #[test]
    fn open_session_is_active_with_no_end_time() {
        let session = Session::open(snapshot(), Utc::now());
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.end_time.is_none());
        assert!(session.duration_secs.is_none());
        assert!(session.recordings.is_empty());
        assert!(session.id.starts_with("session_"));
    }

    #[test]
    fn close_sets_end_time_duration_and_status() {
        let start = Utc::now();
        let mut session = Session::open(snapshot(), start);
        let end = start + chrono::Duration::seconds(125);
        session.close(end);

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.end_time, Some(end));
        assert_eq!(session.duration_secs, Some(125));
        assert_eq!(session.summary().duration_label, "2m 5s");
    }

    #[test]
    fn session_ids_are_unique_within_a_millisecond() {
        let now = Utc::now();
        let a = generate_session_id(now);
        let b = generate_session_id(now);
        assert_ne!(a, b);
    }

    #[test]
    fn motion_event_confidence_is_clamped_linear() {
        let now = Utc::now();
        assert!((MotionEvent::new(now, 11).confidence - 0.011).abs() < 1e-12);
        assert!((MotionEvent::new(now, 500).confidence - 0.5).abs() < 1e-12);
        assert_eq!(MotionEvent::new(now, 5000).confidence, 1.0);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(61), "1m 1s");
        assert_eq!(format_duration(3723), "1h 2m 3s");
    }

    #[test]
    fn settings_label_matches_history_display() {
        assert_eq!(snapshot().label(), "1280x720 @ 30fps");
    }

    #[test]
    fn session_serialization_round_trips() {
        let mut session = Session::open(snapshot(), Utc::now());
        session
            .screenshots
            .push(Screenshot::captured(Utc::now(), "shot.png"));
        session.recordings.push(Recording::started(Utc::now()));
        session.motion_events.push(MotionEvent::new(Utc::now(), 42));

        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn legacy_sessions_without_motion_events_deserialize() {
        let mut value = serde_json::to_value(Session::open(snapshot(), Utc::now())).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .remove("motion_events")
            .unwrap();

        let parsed: Session = serde_json::from_value(value).unwrap();
        assert!(parsed.motion_events.is_empty());
    }
}
