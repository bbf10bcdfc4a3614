//! Error types shared across VigilantEye crates.

/// Top-level error type for VigilantEye operations.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Recording error: {message}")]
    Recording { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VigilError.
pub type VigilResult<T> = Result<T, VigilError>;

impl VigilError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}

/// Classified camera device acquisition failure.
///
/// Each variant maps to one fixed user-facing message. Failures reported
/// by a platform backend under a different name classify as `Unknown`.
/// Device failures are terminal for the `start()` attempt that produced
/// them; nothing retries automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Camera access denied. Please allow camera access and try again.")]
    AccessDenied,

    #[error("No camera found. Please connect a camera and try again.")]
    NotFound,

    #[error("Camera is being used by another application.")]
    Busy,

    #[error("Camera constraints cannot be satisfied.")]
    Unsatisfiable,

    #[error("Unable to access camera. Please check your camera settings.")]
    Unknown,
}

impl DeviceError {
    /// Classify a platform failure by its reported name.
    pub fn from_platform_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => Self::AccessDenied,
            "NotFoundError" => Self::NotFound,
            "NotReadableError" => Self::Busy,
            "OverconstrainedError" => Self::Unsatisfiable,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platform_names_classify() {
        assert_eq!(
            DeviceError::from_platform_name("NotAllowedError"),
            DeviceError::AccessDenied
        );
        assert_eq!(
            DeviceError::from_platform_name("NotFoundError"),
            DeviceError::NotFound
        );
        assert_eq!(
            DeviceError::from_platform_name("NotReadableError"),
            DeviceError::Busy
        );
        assert_eq!(
            DeviceError::from_platform_name("OverconstrainedError"),
            DeviceError::Unsatisfiable
        );
    }

    #[test]
    fn unmapped_platform_names_fall_back_to_unknown() {
        assert_eq!(
            DeviceError::from_platform_name("AbortError"),
            DeviceError::Unknown
        );
        assert_eq!(DeviceError::from_platform_name(""), DeviceError::Unknown);
    }

    #[test]
    fn device_error_messages_are_user_facing() {
        assert_eq!(
            DeviceError::AccessDenied.to_string(),
            "Camera access denied. Please allow camera access and try again."
        );
        assert_eq!(
            DeviceError::Busy.to_string(),
            "Camera is being used by another application."
        );
    }
}
