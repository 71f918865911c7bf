//! Motor output traits

use crate::motor::CHANNEL_COUNT;

/// Four PWM drive channels
///
/// Implementations write duty cycles straight to the hardware with no
/// ramping. Channel order is m1..m4 as laid out in [`crate::motor::command`].
pub trait MotorOutputs {
    /// Apply duty cycles in [0, 1] to all four channels
    fn set_duties(&mut self, duties: [f32; CHANNEL_COUNT]);

    /// Read back the duty cycles currently on the outputs
    fn duties(&self) -> [f32; CHANNEL_COUNT];

    /// Force every channel to zero
    fn zero(&mut self) {
        self.set_duties([0.0; CHANNEL_COUNT]);
    }
}
