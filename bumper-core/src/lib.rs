//! Board-agnostic control core for the Bumper robot
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Shared control state behind a critical-section mutex
//! - Motor actuator with a movement watchdog
//! - Obstacle monitor (ultrasonic detection window state machine)
//! - Input router for buttons and serial commands
//! - Main poll loop step
//! - Configuration type definitions
//! - Hardware abstraction traits (motor outputs, serial input, mode switch)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod input;
pub mod motor;
pub mod poll;
pub mod safety;
pub mod state;
pub mod timer;
pub mod traits;
