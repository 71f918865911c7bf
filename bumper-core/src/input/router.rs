//! Input router
//!
//! Resolves an input event into what should happen to the motors:
//!
//! | Source | Accepted in | Blocked gating                  |
//! |--------|-------------|---------------------------------|
//! | serial | `Remote`    | forward-producing moves dropped |
//! | button | `Local`     | forward-producing moves dropped |
//!
//! Speed presets (`1`, `2`) are applied regardless of the safety state.
//! The router never touches the actuator; an accepted move is returned as
//! a [`MotorCommand`] for the caller to hand over.

use core::fmt;

use crate::config::SpeedConfig;
use crate::motor::{Direction, MotorCommand};
use crate::state::{InputMode, SharedControl, SpeedLevel};
use crate::traits::ModeSwitch;

/// Direction buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Front,
    Back,
    Left,
    Right,
}

impl Button {
    /// Direction requested by this button
    pub fn direction(&self) -> Direction {
        match self {
            Button::Front => Direction::Forward,
            Button::Back => Direction::Backward,
            Button::Left => Direction::TurnLeft,
            Button::Right => Direction::TurnRight,
        }
    }
}

/// Decoded serial command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialCommand {
    /// `w`, `a`, `s`, `d`
    Move(Direction),
    /// `1`, `2`
    Speed(SpeedLevel),
}

impl SerialCommand {
    /// Decode a single command character
    pub fn decode(byte: u8) -> Result<Self, InputError> {
        match byte {
            b'w' => Ok(SerialCommand::Move(Direction::Forward)),
            b'a' => Ok(SerialCommand::Move(Direction::TurnLeft)),
            b's' => Ok(SerialCommand::Move(Direction::Backward)),
            b'd' => Ok(SerialCommand::Move(Direction::TurnRight)),
            b'1' => Ok(SerialCommand::Speed(SpeedLevel::Low)),
            b'2' => Ok(SerialCommand::Speed(SpeedLevel::High)),
            other => Err(InputError::InvalidCommand(other)),
        }
    }
}

/// Input errors
///
/// Never fatal: the event is dropped and the state left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Byte outside the command alphabet
    InvalidCommand(u8),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::InvalidCommand(_) => f.write_str("invalid input !"),
        }
    }
}

/// Result of routing one event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Routed {
    /// Hand this command to the actuator
    Drive(MotorCommand),
    /// Speed preset changed, motors untouched
    SpeedChanged(SpeedLevel),
    /// Move dropped because an obstacle is detected
    Suppressed(Direction),
    /// Event does not apply in the current input mode
    Ignored,
}

/// Routes operator input to motor commands
pub struct InputRouter<'a, M: ModeSwitch> {
    shared: &'a SharedControl,
    speeds: SpeedConfig,
    mode_switch: M,
}

impl<'a, M: ModeSwitch> InputRouter<'a, M> {
    pub fn new(shared: &'a SharedControl, speeds: &SpeedConfig, mode_switch: M) -> Self {
        Self {
            shared,
            speeds: *speeds,
            mode_switch,
        }
    }

    /// Input mode read from the switch right now
    pub fn mode(&self) -> InputMode {
        self.mode_switch.mode()
    }

    /// Route one serial byte
    ///
    /// Only `Remote` mode accepts serial commands. Unknown bytes are
    /// reported as [`InputError::InvalidCommand`].
    pub fn route_serial(&self, byte: u8) -> Result<Routed, InputError> {
        if self.mode() != InputMode::Remote {
            return Ok(Routed::Ignored);
        }

        match SerialCommand::decode(byte)? {
            SerialCommand::Move(direction) => Ok(self.route_move(direction)),
            SerialCommand::Speed(level) => {
                self.shared.set_speed(level);
                Ok(Routed::SpeedChanged(level))
            }
        }
    }

    /// Route a confirmed button press
    ///
    /// Buttons are inert in `Remote` mode.
    pub fn route_button(&self, button: Button) -> Routed {
        if self.mode() != InputMode::Local {
            return Routed::Ignored;
        }
        self.route_move(button.direction())
    }

    fn route_move(&self, direction: Direction) -> Routed {
        // Safety and speed read together so the decision sees one snapshot
        let state = self.shared.snapshot();

        if state.safety.is_blocked() && direction.is_forward_producing() {
            return Routed::Suppressed(direction);
        }

        let duty = state.speed.duty(&self.speeds);
        Routed::Drive(MotorCommand::for_direction(direction, duty))
    }
}
