//! Shared control state
//!
//! The small set of flags and values read and written from handler
//! context and from the poll loop.

pub mod shared;

pub use shared::{
    ControlState, DetectionWindow, InputMode, SafetyState, SharedControl, SpeedLevel,
};
