//! Configuration type definitions
//!
//! Defaults are the design values of the robot: 0.3/0.6 speed presets,
//! a 3 s movement watchdog, a 500 ms sonar period with a 50 ms detection
//! window, and a 10 ms poll tick.

use core::fmt;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// What the obstacle monitor stops when a measurement reports an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlockStopPolicy {
    /// Stop only when both reverse channels are active
    #[default]
    Reversing,
    /// Stop whenever any channel is active
    AnyMotion,
}

/// Speed preset duty cycles
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeedConfig {
    /// Duty cycle for the low preset (serial `1`)
    pub low: f32,
    /// Duty cycle for the high preset (serial `2`)
    pub high: f32,
}

impl SpeedConfig {
    pub const DEFAULT: Self = Self {
        low: 0.3,
        high: 0.6,
    };
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Motor actuator settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorConfig {
    /// Movement watchdog duration in ms
    pub watchdog_ms: u32,
    /// Duty cycle at or above which a channel counts as powered
    pub activation_threshold: f32,
}

impl MotorConfig {
    pub const DEFAULT: Self = Self {
        watchdog_ms: 3000,
        activation_threshold: 0.01,
    };
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Ultrasonic obstacle monitor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SonarConfig {
    /// Measurement trigger period in ms
    pub period_ms: u32,
    /// Detection window after each trigger in ms
    pub window_ms: u32,
    /// Motion stopped when an obstacle is detected
    pub stop_policy: BlockStopPolicy,
}

impl SonarConfig {
    pub const DEFAULT: Self = Self {
        period_ms: 500,
        window_ms: 50,
        stop_policy: BlockStopPolicy::Reversing,
    };
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Button input settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputConfig {
    /// Time a button must stay low after a falling edge, in ms
    pub debounce_ms: u32,
}

impl InputConfig {
    pub const DEFAULT: Self = Self { debounce_ms: 30 };
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Main poll loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PollConfig {
    /// Tick interval in ms
    pub interval_ms: u32,
}

impl PollConfig {
    pub const DEFAULT: Self = Self { interval_ms: 10 };
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    pub speed: SpeedConfig,
    pub motor: MotorConfig,
    pub sonar: SonarConfig,
    pub input: InputConfig,
    pub poll: PollConfig,
}

impl RobotConfig {
    /// Design-value configuration
    pub const DEFAULT: Self = Self {
        speed: SpeedConfig::DEFAULT,
        motor: MotorConfig::DEFAULT,
        sonar: SonarConfig::DEFAULT,
        input: InputConfig::DEFAULT,
        poll: PollConfig::DEFAULT,
    };

    /// Check all values are usable
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for duty in [self.speed.low, self.speed.high] {
            if !(duty > 0.0 && duty <= 1.0) {
                return Err(ConfigError::InvalidSpeed);
            }
        }

        if self.motor.watchdog_ms == 0 {
            return Err(ConfigError::InvalidWatchdog);
        }

        let threshold = self.motor.activation_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::InvalidThreshold);
        }

        if self.sonar.period_ms == 0 || self.sonar.window_ms == 0 {
            return Err(ConfigError::InvalidSonarTiming);
        }

        // A window must close before the next trigger re-arms it
        if self.sonar.window_ms >= self.sonar.period_ms {
            return Err(ConfigError::WindowExceedsPeriod);
        }

        if self.poll.interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Speed preset outside (0, 1]
    InvalidSpeed,
    /// Watchdog duration is zero
    InvalidWatchdog,
    /// Activation threshold outside (0, 1)
    InvalidThreshold,
    /// Sonar period or window is zero
    InvalidSonarTiming,
    /// Detection window not shorter than the trigger period
    WindowExceedsPeriod,
    /// Poll interval is zero
    InvalidPollInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::InvalidSpeed => "speed presets must be in (0, 1]",
            ConfigError::InvalidWatchdog => "motor.watchdog_ms must be non-zero",
            ConfigError::InvalidThreshold => "motor.activation_threshold must be in (0, 1)",
            ConfigError::InvalidSonarTiming => "sonar.period_ms and sonar.window_ms must be non-zero",
            ConfigError::WindowExceedsPeriod => "sonar.window_ms must be shorter than sonar.period_ms",
            ConfigError::InvalidPollInterval => "poll.interval_ms must be non-zero",
        };
        f.write_str(msg)
    }
}
