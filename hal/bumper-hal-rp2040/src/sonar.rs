//! Ultrasonic proximity sensor
//!
//! The sensor is started by a short pulse on the trigger pin and answers
//! with a rising edge on the echo pin when an obstacle is within range.
//! No answer means the path is clear; the caller bounds the wait with its
//! detection window.

use embassy_rp::gpio::{Input, Output};
use embassy_time::Timer;

/// Trigger pulse width in microseconds
pub const TRIGGER_PULSE_US: u64 = 10;

/// Trigger output of the sensor
pub struct RpSonarTrigger {
    pin: Output<'static>,
}

/// Echo input of the sensor
pub struct RpSonarEcho {
    pin: Input<'static>,
}

/// Ultrasonic sensor on two GPIOs
pub struct RpSonar {
    trigger: RpSonarTrigger,
    echo: RpSonarEcho,
}

impl RpSonar {
    /// Create the sensor; the trigger pin must start low
    pub fn new(trigger: Output<'static>, echo: Input<'static>) -> Self {
        Self {
            trigger: RpSonarTrigger { pin: trigger },
            echo: RpSonarEcho { pin: echo },
        }
    }

    /// Split into halves owned by the trigger and echo tasks
    pub fn split(self) -> (RpSonarTrigger, RpSonarEcho) {
        (self.trigger, self.echo)
    }
}

impl RpSonarTrigger {
    /// Request one measurement
    pub async fn trigger(&mut self) {
        self.pin.set_high();
        Timer::after_micros(TRIGGER_PULSE_US).await;
        self.pin.set_low();
    }
}

impl RpSonarEcho {
    /// Wait for the next echo
    pub async fn wait_echo(&mut self) {
        self.pin.wait_for_rising_edge().await;
    }
}
