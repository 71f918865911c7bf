//! RP2040-specific HAL for the Bumper robot
//!
//! Implements the `bumper-core` hardware traits on `embassy-rp`:
//!
//! - Four motor channels on two PWM slices
//! - Mode switch on a GPIO input
//! - Ultrasonic sensor trigger and echo pins

#![no_std]

pub mod motor;
pub mod pwm;
pub mod sonar;
pub mod switch;

pub use motor::RpMotorOutputs;
pub use sonar::{RpSonar, RpSonarEcho, RpSonarTrigger};
pub use switch::RpModeSwitch;
