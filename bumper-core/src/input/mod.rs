//! Operator input
//!
//! Buttons and serial commands are resolved into motor commands here,
//! gated by the mode switch and the safety state.

pub mod router;

pub use router::{Button, InputError, InputRouter, Routed, SerialCommand};
