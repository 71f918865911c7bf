//! Mode switch input

use embassy_rp::gpio::Input;

use bumper_core::traits::ModeSwitch;

/// Toggle switch on a GPIO input, high selects remote control
///
/// The level is sampled on every read, with no debouncing.
pub struct RpModeSwitch {
    pin: Input<'static>,
}

impl RpModeSwitch {
    pub fn new(pin: Input<'static>) -> Self {
        Self { pin }
    }
}

impl ModeSwitch for RpModeSwitch {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
