//! Ultrasonic trigger task
//!
//! Opens a detection window every sonar period and closes it at its
//! deadline. An echo inside the window is handled by the echo task.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use bumper_core::config::SonarConfig;
use bumper_core::safety::{ObstacleMonitor, WindowOutcome};
use bumper_hal_rp2040::RpSonarTrigger;

use crate::channels::CONTROL;
use crate::clock::{instant_at, now_ms};

/// Sonar trigger task
#[embassy_executor::task]
pub async fn sonar_task(mut trigger: RpSonarTrigger, config: SonarConfig) {
    info!(
        "Sonar task started (period {}ms, window {}ms)",
        config.period_ms, config.window_ms
    );

    let monitor = ObstacleMonitor::new(&CONTROL, &config);
    let mut ticker = Ticker::every(Duration::from_millis(monitor.period_ms() as u64));

    loop {
        ticker.next().await;

        let deadline = monitor.begin_measurement(now_ms());
        trigger.trigger().await;

        Timer::at(instant_at(deadline)).await;

        match monitor.on_window_expired() {
            WindowOutcome::Cleared { was_blocked: true } => info!("Path clear"),
            WindowOutcome::Cleared { was_blocked: false } => trace!("No echo"),
            WindowOutcome::Ignored => trace!("Window already resolved by echo"),
        }
    }
}
