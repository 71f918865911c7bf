//! Obstacle safety
//!
//! Tracks the ultrasonic detection window and the resulting safety flag.

pub mod monitor;

pub use monitor::{EchoOutcome, MonitorPhase, ObstacleMonitor, WindowOutcome};
