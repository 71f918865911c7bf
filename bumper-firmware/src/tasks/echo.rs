//! Ultrasonic echo task

use defmt::*;

use bumper_core::config::SonarConfig;
use bumper_core::safety::{EchoOutcome, ObstacleMonitor};
use bumper_hal_rp2040::RpSonarEcho;

use crate::channels::{MotorRequest, CONTROL, MOTOR_REQ};

/// Echo task - resolves the open window when the sensor answers
#[embassy_executor::task]
pub async fn echo_task(mut echo: RpSonarEcho, config: SonarConfig) {
    info!("Echo task started (stop policy {})", config.stop_policy);

    let monitor = ObstacleMonitor::new(&CONTROL, &config);

    loop {
        echo.wait_echo().await;

        match monitor.on_echo() {
            EchoOutcome::Blocked {
                newly_blocked,
                stop_motors,
            } => {
                if newly_blocked {
                    warn!("Obstacle detected, forward motion blocked");
                }
                if stop_motors {
                    MOTOR_REQ.signal(MotorRequest::Stop);
                    warn!("Moving into obstacle, stopping motors");
                }
            }
            EchoOutcome::Ignored => trace!("Late echo ignored"),
        }
    }
}
