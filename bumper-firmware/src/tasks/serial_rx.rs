//! Serial receive task
//!
//! Queues every received byte for the poll loop and raises the
//! pending-serial flag. Commands are not interpreted here.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::{CONTROL, SERIAL_RX};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 16;

/// Serial RX task
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    if SERIAL_RX.try_send(byte).is_err() {
                        warn!("Serial queue full, dropping byte");
                    }
                    CONTROL.raise_serial_pending();
                }
            }
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}
