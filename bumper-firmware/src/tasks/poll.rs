//! Main poll loop task
//!
//! Runs in thread mode, so every handler task can preempt it. Consumes at
//! most one serial command per tick.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::Timer;
use embedded_io_async::Write;

use bumper_core::config::{PollConfig, SpeedConfig};
use bumper_core::input::InputRouter;
use bumper_core::poll::{PollLoop, TickOutcome};
use bumper_hal_rp2040::RpModeSwitch;

use crate::channels::{SerialQueue, CONTROL};
use crate::tasks::motor::dispatch;

/// Reply sent for a byte outside the command alphabet
const INVALID_INPUT_REPLY: &[u8] = b"invalid input !\r\n";

/// Poll loop task
#[embassy_executor::task]
pub async fn poll_task(
    mut tx: BufferedUartTx,
    mode_switch: &'static RpModeSwitch,
    speeds: SpeedConfig,
    config: PollConfig,
) {
    info!("Poll loop started ({}ms tick)", config.interval_ms);

    let router = InputRouter::new(&CONTROL, &speeds, mode_switch);
    let mut poll = PollLoop::new(router, &CONTROL);
    let mut serial = SerialQueue;
    let mut last_mode = poll.router().mode();

    loop {
        let mode = poll.router().mode();
        if mode != last_mode {
            info!("Input mode: {}", mode);
            last_mode = mode;
        }

        match poll.tick(&mut serial) {
            Ok(TickOutcome::Routed(routed)) => dispatch(routed),
            Ok(TickOutcome::Drained(count)) => trace!("Discarded {} serial bytes", count),
            Ok(TickOutcome::Idle) => {}
            Err(e) => {
                warn!("{}: {}", Display2Format(&e), e);
                if let Err(e) = tx.write_all(INVALID_INPUT_REPLY).await {
                    warn!("UART write error: {:?}", e);
                }
            }
        }

        Timer::after_millis(config.interval_ms as u64).await;
    }
}
