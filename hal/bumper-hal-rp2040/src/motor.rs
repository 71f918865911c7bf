//! PWM motor outputs
//!
//! Each wheel uses one PWM slice: channel A drives the forward input of
//! the H-bridge, channel B the reverse input.
//!
//! | Slice | A  | B  |
//! |-------|----|----|
//! | left  | m1 | m2 |
//! | right | m3 | m4 |

use embassy_rp::pwm::{Config as PwmConfig, Pwm};

use bumper_core::motor::command::{LEFT_FORWARD, LEFT_REVERSE, RIGHT_FORWARD, RIGHT_REVERSE};
use bumper_core::motor::CHANNEL_COUNT;
use bumper_core::traits::MotorOutputs;

use crate::pwm::{duty_to_compare, top_for_frequency};

/// Four motor channels on two PWM slices
pub struct RpMotorOutputs {
    left: Pwm<'static>,
    right: Pwm<'static>,
    left_config: PwmConfig,
    right_config: PwmConfig,
    duties: [f32; CHANNEL_COUNT],
}

impl RpMotorOutputs {
    /// Take over two PWM slices and start them with every channel off
    ///
    /// Both slices are created with `Pwm::new_output_ab`; their current
    /// configuration is replaced.
    pub fn new(mut left: Pwm<'static>, mut right: Pwm<'static>, freq_hz: u32) -> Self {
        let mut config = PwmConfig::default();
        config.top = top_for_frequency(freq_hz);
        config.compare_a = 0;
        config.compare_b = 0;

        left.set_config(&config);
        right.set_config(&config);

        Self {
            left,
            right,
            left_config: config.clone(),
            right_config: config,
            duties: [0.0; CHANNEL_COUNT],
        }
    }
}

impl MotorOutputs for RpMotorOutputs {
    fn set_duties(&mut self, duties: [f32; CHANNEL_COUNT]) {
        let top = self.left_config.top;
        self.left_config.compare_a = duty_to_compare(duties[LEFT_FORWARD], top);
        self.left_config.compare_b = duty_to_compare(duties[LEFT_REVERSE], top);
        self.left.set_config(&self.left_config);

        let top = self.right_config.top;
        self.right_config.compare_a = duty_to_compare(duties[RIGHT_FORWARD], top);
        self.right_config.compare_b = duty_to_compare(duties[RIGHT_REVERSE], top);
        self.right.set_config(&self.right_config);

        self.duties = duties;
    }

    fn duties(&self) -> [f32; CHANNEL_COUNT] {
        self.duties
    }
}
