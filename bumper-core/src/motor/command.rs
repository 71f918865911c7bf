//! Motor command vectors
//!
//! The robot has two wheels, each driven through an opposing pair of
//! channels. Channel layout:
//!
//! | Index | Channel | Wheel | Sense   |
//! |-------|---------|-------|---------|
//! | 0     | m1      | left  | forward |
//! | 1     | m2      | left  | reverse |
//! | 2     | m3      | right | forward |
//! | 3     | m4      | right | reverse |
//!
//! Both channels of a pair must never be powered at the same time.

use core::fmt;

/// Number of drive channels
pub const CHANNEL_COUNT: usize = 4;

/// Left wheel forward channel
pub const LEFT_FORWARD: usize = 0;
/// Left wheel reverse channel
pub const LEFT_REVERSE: usize = 1;
/// Right wheel forward channel
pub const RIGHT_FORWARD: usize = 2;
/// Right wheel reverse channel
pub const RIGHT_REVERSE: usize = 3;

/// Requested direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Both wheels forward
    Forward,
    /// Both wheels in reverse
    Backward,
    /// Pivot left: left wheel reverse, right wheel forward
    TurnLeft,
    /// Pivot right: left wheel forward, right wheel reverse
    TurnRight,
}

impl Direction {
    /// Check if this direction powers any forward channel
    ///
    /// Forward-producing directions are suppressed while an obstacle is
    /// detected; only `Backward` moves purely away from it.
    pub fn is_forward_producing(&self) -> bool {
        !matches!(self, Direction::Backward)
    }

    /// Channels powered by this direction, one per wheel pair
    fn active_channels(&self) -> (usize, usize) {
        match self {
            Direction::Forward => (LEFT_FORWARD, RIGHT_FORWARD),
            Direction::Backward => (LEFT_REVERSE, RIGHT_REVERSE),
            Direction::TurnLeft => (LEFT_REVERSE, RIGHT_FORWARD),
            Direction::TurnRight => (LEFT_FORWARD, RIGHT_REVERSE),
        }
    }
}

/// One wheel's channel pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WheelPair {
    Left,
    Right,
}

impl WheelPair {
    /// (forward, reverse) channel indices of this pair
    pub fn channels(&self) -> (usize, usize) {
        match self {
            WheelPair::Left => (LEFT_FORWARD, LEFT_REVERSE),
            WheelPair::Right => (RIGHT_FORWARD, RIGHT_REVERSE),
        }
    }
}

/// Motor command faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorFault {
    /// Both channels of a wheel pair are powered
    PairConflict(WheelPair),
}

impl fmt::Display for MotorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorFault::PairConflict(WheelPair::Left) => {
                f.write_str("invalid power feed to motors: +m1 & +m2")
            }
            MotorFault::PairConflict(WheelPair::Right) => {
                f.write_str("invalid power feed to motors: +m3 & +m4")
            }
        }
    }
}

/// Four-channel duty cycle vector
///
/// Created per command and consumed immediately by the actuator; it has
/// no identity beyond its values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorCommand {
    channels: [f32; CHANNEL_COUNT],
}

impl MotorCommand {
    /// All channels off
    pub const STOP: Self = Self {
        channels: [0.0; CHANNEL_COUNT],
    };

    /// Build the command for a direction at the given duty cycle
    ///
    /// Each direction powers exactly one channel of each wheel pair, so
    /// the result never has a pair conflict.
    pub fn for_direction(direction: Direction, duty: f32) -> Self {
        let duty = clamp_duty(duty);
        let (left, right) = direction.active_channels();
        let mut channels = [0.0; CHANNEL_COUNT];
        channels[left] = duty;
        channels[right] = duty;
        Self { channels }
    }

    /// Build a command from raw channel values (m1..m4)
    ///
    /// Values are clamped to [0, 1] but pair conflicts are not rejected
    /// here; [`MotorCommand::validate`] reports them.
    pub fn from_channels(channels: [f32; CHANNEL_COUNT]) -> Self {
        Self {
            channels: channels.map(clamp_duty),
        }
    }

    /// Check the opposing-pair invariant
    pub fn validate(&self) -> Result<(), MotorFault> {
        for pair in [WheelPair::Left, WheelPair::Right] {
            let (fwd, rev) = pair.channels();
            if self.channels[fwd] > 0.0 && self.channels[rev] > 0.0 {
                return Err(MotorFault::PairConflict(pair));
            }
        }
        Ok(())
    }

    /// Raw channel values (m1..m4)
    pub fn channels(&self) -> [f32; CHANNEL_COUNT] {
        self.channels
    }

    /// Check if either forward channel is powered
    pub fn powers_forward(&self) -> bool {
        self.channels[LEFT_FORWARD] > 0.0 || self.channels[RIGHT_FORWARD] > 0.0
    }

    /// Check if every channel is off
    pub fn is_stopped(&self) -> bool {
        self.channels.iter().all(|&duty| duty == 0.0)
    }
}

/// Signed drive power per wheel, positive = forward
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelPowers {
    pub left: f32,
    pub right: f32,
}

/// Duty cycles currently applied to the outputs
///
/// Published by the actuator after every change, read by the obstacle
/// monitor and by display or telemetry observers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputSnapshot {
    pub duties: [f32; CHANNEL_COUNT],
}

impl OutputSnapshot {
    /// All outputs at zero
    pub const IDLE: Self = Self {
        duties: [0.0; CHANNEL_COUNT],
    };

    /// Check if both reverse channels are powered (driving backward)
    pub fn is_reversing(&self) -> bool {
        self.duties[LEFT_REVERSE] != 0.0 && self.duties[RIGHT_REVERSE] != 0.0
    }

    /// Check if any channel is powered
    pub fn is_moving(&self) -> bool {
        self.duties.iter().any(|&duty| duty != 0.0)
    }

    /// Combine each pair into a signed wheel power
    ///
    /// A channel counts as powered at or above `threshold`. Both channels of
    /// a pair powered is reported as a fault instead of a reading.
    pub fn wheel_powers(&self, threshold: f32) -> Result<WheelPowers, MotorFault> {
        let left = self.pair_power(WheelPair::Left, threshold)?;
        let right = self.pair_power(WheelPair::Right, threshold)?;
        Ok(WheelPowers { left, right })
    }

    fn pair_power(&self, pair: WheelPair, threshold: f32) -> Result<f32, MotorFault> {
        let (fwd, rev) = pair.channels();
        let forward = self.duties[fwd];
        let reverse = self.duties[rev];

        match (forward >= threshold, reverse >= threshold) {
            (true, true) => Err(MotorFault::PairConflict(pair)),
            (true, false) => Ok(forward),
            (false, true) => Ok(-reverse),
            (false, false) => Ok(0.0),
        }
    }
}

fn clamp_duty(duty: f32) -> f32 {
    // NaN collapses to 0 so a bad value can never power a channel
    if duty > 0.0 {
        duty.min(1.0)
    } else {
        0.0
    }
}
