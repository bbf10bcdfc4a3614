//! VigilantEye Detection Core
//!
//! Lightweight per-frame heuristics run against the live capture buffer:
//! - **MotionDetector:** consecutive-frame channel differencing under a
//!   sensitivity threshold
//! - **ObjectHeuristic:** dark-pixel density as a coarse object-count
//!   approximation
//!
//! These are deliberately crude intensity heuristics, not trained models;
//! their exact formulas are part of the behavioral contract.

pub mod frame;
pub mod motion;
pub mod objects;

pub use frame::*;
pub use motion::*;
pub use objects::*;
