//! VigilantEye Session Model
//!
//! Defines the data contracts for monitoring sessions:
//! - **Session:** the record of one continuous camera-active interval and
//!   everything produced during it (recordings, screenshots, motion events)
//! - **SessionStore:** the ordered, size-bounded history of sessions with
//!   write-through persistence across restarts
//!
//! Sessions are owned exclusively by the store after creation; collaborators
//! hold session ids and mutate through the store's API.

pub mod session;
pub mod store;

pub use session::*;
pub use store::*;
