//! Boundary status surface.
//!
//! The controller keeps these fields authoritative and exposes them as a
//! snapshot; UI layers render them without recomputing anything.

use serde::Serialize;

/// Camera connection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl ConnectionStatus {
    /// Display label, e.g. `"Connected"` or `"Error: No camera found…"`.
    pub fn label(&self) -> String {
        match self {
            Self::Disconnected => "Disconnected".to_string(),
            Self::Connecting => "Connecting...".to_string(),
            Self::Connected => "Connected".to_string(),
            Self::Error(message) => format!("Error: {message}"),
        }
    }
}

/// Motion detection state as surfaced to the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MotionStatus {
    /// Detection is switched off.
    #[default]
    Disabled,
    /// Detection is on; the last frame showed no motion.
    Monitoring,
    /// The last frame tripped the motion threshold.
    Detected,
}

impl MotionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Monitoring => "Monitoring",
            Self::Detected => "Motion Detected",
        }
    }
}

/// Snapshot of everything the boundary displays live.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MonitorStatus {
    pub connection: ConnectionStatus,

    /// Negotiated resolution label while connected.
    pub resolution: Option<String>,

    /// Frames drawn in the last sampled wall-clock second.
    pub fps: u32,

    pub recording: bool,

    /// Recording elapsed time as `MM:SS` while recording.
    pub recording_elapsed: Option<String>,

    pub motion: MotionStatus,

    /// Object count from the most recent analyzed frame.
    pub object_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_labels() {
        assert_eq!(ConnectionStatus::Connected.label(), "Connected");
        assert_eq!(
            ConnectionStatus::Error("No camera found. Please connect a camera and try again.".into())
                .label(),
            "Error: No camera found. Please connect a camera and try again."
        );
    }

    #[test]
    fn default_status_is_idle() {
        let status = MonitorStatus::default();
        assert_eq!(status.connection, ConnectionStatus::Disconnected);
        assert_eq!(status.motion, MotionStatus::Disabled);
        assert!(!status.recording);
        assert_eq!(status.fps, 0);
    }
}
