//! Telemetry task
//!
//! Samples the published motor outputs and the obstacle monitor phase and
//! logs them when they change. A powered opposing pair is reported as a
//! fault.

use defmt::*;
use embassy_time::{Duration, Ticker};

use bumper_core::config::{MotorConfig, SonarConfig};
use bumper_core::safety::ObstacleMonitor;

use crate::channels::CONTROL;

/// Sample interval in milliseconds
pub const TELEMETRY_INTERVAL_MS: u64 = 200;

/// Telemetry task
#[embassy_executor::task]
pub async fn telemetry_task(motor: MotorConfig, sonar: SonarConfig) {
    info!("Telemetry task started");

    let monitor = ObstacleMonitor::new(&CONTROL, &sonar);
    let mut ticker = Ticker::every(Duration::from_millis(TELEMETRY_INTERVAL_MS));
    let mut last = None;

    loop {
        ticker.next().await;

        let outputs = CONTROL.outputs();
        let phase = monitor.phase();
        if last == Some((outputs, phase)) {
            continue;
        }

        match outputs.wheel_powers(motor.activation_threshold) {
            Ok(powers) => debug!(
                "Wheels L={} R={} sonar={} speed={}",
                powers.left,
                powers.right,
                phase,
                CONTROL.speed()
            ),
            Err(fault) => error!("{}", Display2Format(&fault)),
        }

        last = Some((outputs, phase));
    }
}
