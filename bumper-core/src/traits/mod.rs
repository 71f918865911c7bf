//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic
//! and board-specific implementations.

pub mod input;
pub mod motor;

pub use input::{ModeSwitch, SerialInput};
pub use motor::MotorOutputs;
