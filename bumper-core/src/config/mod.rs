//! Configuration types
//!
//! Board-agnostic robot configuration. The firmware bakes a validated
//! `RobotConfig` in at build time from `robot.toml`.

pub mod types;

pub use types::*;
