//! Motor command vectors and the actuator
//!
//! - [`command`]: four-channel duty vectors and the opposing-pair invariant
//! - [`actuator`]: applies commands to the outputs behind a movement watchdog

pub mod actuator;
pub mod command;

pub use actuator::{Actuator, DriveOutcome};
pub use command::{
    Direction, MotorCommand, MotorFault, OutputSnapshot, WheelPair, WheelPowers, CHANNEL_COUNT,
};
