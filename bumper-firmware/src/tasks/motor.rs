//! Motor actuator task
//!
//! Sole owner of the PWM outputs. Waits for the next motor request or the
//! watchdog deadline, whichever comes first.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::Timer;

use bumper_core::config::MotorConfig;
use bumper_core::input::Routed;
use bumper_core::motor::{Actuator, DriveOutcome};
use bumper_hal_rp2040::RpMotorOutputs;

use crate::channels::{MotorRequest, CONTROL, MOTOR_REQ};
use crate::clock::{instant_at, now_ms};

/// Motor task
#[embassy_executor::task]
pub async fn motor_task(outputs: RpMotorOutputs, config: MotorConfig) {
    info!("Motor task started (watchdog {}ms)", config.watchdog_ms);

    let mut actuator = Actuator::new(outputs, &config, &CONTROL);

    loop {
        let request = match actuator.watchdog_deadline() {
            Some(deadline) => match select(MOTOR_REQ.wait(), Timer::at(instant_at(deadline))).await {
                Either::First(request) => Some(request),
                Either::Second(()) => None,
            },
            None => Some(MOTOR_REQ.wait().await),
        };

        match request {
            Some(MotorRequest::Drive(command)) => match actuator.drive(command, now_ms()) {
                Ok(DriveOutcome::Applied) => debug!("Drive {}", command.channels()),
                Ok(DriveOutcome::Suppressed) => info!("Obstacle ahead, command dropped"),
                Err(fault) => error!("{}; cycle aborted", Display2Format(&fault)),
            },
            Some(MotorRequest::Stop) => {
                actuator.stop();
                debug!("Motors stopped");
            }
            None => {
                if actuator.poll_watchdog(now_ms()) {
                    info!("No command for {}ms, motors stopped", config.watchdog_ms);
                }
            }
        }
    }
}

/// Hand a routed input event to the motor task
pub fn dispatch(routed: Routed) {
    match routed {
        Routed::Drive(command) => MOTOR_REQ.signal(MotorRequest::Drive(command)),
        Routed::SpeedChanged(level) => info!("Speed preset {}", level),
        Routed::Suppressed(direction) => info!("Obstacle ahead, {} ignored", direction),
        Routed::Ignored => trace!("Input ignored in current mode"),
    }
}
