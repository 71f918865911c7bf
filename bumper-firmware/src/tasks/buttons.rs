//! Direction button tasks
//!
//! One task per button. A falling edge counts as a press once the pin is
//! still low after the debounce interval.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use bumper_core::config::{InputConfig, SpeedConfig};
use bumper_core::input::{Button, InputRouter};
use bumper_hal_rp2040::RpModeSwitch;

use crate::channels::CONTROL;
use crate::tasks::motor::dispatch;

/// Button task, one instance per direction button
#[embassy_executor::task(pool_size = 4)]
pub async fn button_task(
    mut pin: Input<'static>,
    button: Button,
    mode_switch: &'static RpModeSwitch,
    speeds: SpeedConfig,
    config: InputConfig,
) {
    info!("Button task started: {}", button);

    let router = InputRouter::new(&CONTROL, &speeds, mode_switch);

    loop {
        pin.wait_for_falling_edge().await;
        Timer::after_millis(config.debounce_ms as u64).await;

        if pin.is_high() {
            trace!("{} bounce ignored", button);
            continue;
        }

        debug!("{} pressed", button);
        dispatch(router.route_button(button));
    }
}
