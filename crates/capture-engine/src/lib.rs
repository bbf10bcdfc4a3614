//! VigilantEye Capture Engine
//!
//! Orchestrates the camera lifecycle, the per-frame analysis loop, and
//! manual recording/screenshot actions around the session history store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               CaptureController                   │
//! │  ┌────────────┐ ┌────────────────┐ ┌───────────┐ │
//! │  │ FrameSource│ │ MotionDetector │ │ Recording │ │
//! │  │ (device)   │ │ ObjectHeuristic│ │ Manager   │ │
//! │  └──────┬─────┘ └───────┬────────┘ └─────┬─────┘ │
//! │         │               │                │        │
//! │         ▼               ▼                ▼        │
//! │  ┌──────────────────────────────────────────────┐ │
//! │  │   SessionStore (persisted history, cap 50)   │ │
//! │  └──────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod controller;
pub mod recorder;
pub mod source;
pub mod status;

pub use controller::*;
pub use recorder::*;
pub use source::*;
pub use status::*;
