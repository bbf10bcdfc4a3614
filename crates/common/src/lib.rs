//! VigilantEye Common Utilities
//!
//! Shared infrastructure for all VigilantEye crates:
//! - Error types and result aliases, including camera device classification
//! - Clock and FPS accounting utilities
//! - The key-value storage boundary used for settings and session history
//! - Camera settings with persisted defaults
//! - Tracing/logging initialization

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use storage::*;
