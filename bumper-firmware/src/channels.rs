//! Shared state and inter-task channels
//!
//! Handler tasks run on the interrupt executor and preempt the poll loop;
//! everything they share with it lives here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use bumper_core::motor::MotorCommand;
use bumper_core::state::SharedControl;
use bumper_core::traits::SerialInput;

/// Capacity of the serial byte queue
const SERIAL_QUEUE_SIZE: usize = 32;

/// Control state shared by every task
pub static CONTROL: SharedControl = SharedControl::new();

/// Request for the motor task
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum MotorRequest {
    /// Apply a command and re-arm the watchdog
    Drive(MotorCommand),
    /// Zero all outputs now
    Stop,
}

/// Motor request signal (latest request wins)
pub static MOTOR_REQ: Signal<CriticalSectionRawMutex, MotorRequest> = Signal::new();

/// Serial bytes received but not yet consumed by the poll loop
pub static SERIAL_RX: Channel<CriticalSectionRawMutex, u8, SERIAL_QUEUE_SIZE> = Channel::new();

/// Non-blocking view of [`SERIAL_RX`] for the poll loop
pub struct SerialQueue;

impl SerialInput for SerialQueue {
    fn is_readable(&self) -> bool {
        !SERIAL_RX.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        SERIAL_RX.try_receive().ok()
    }
}
