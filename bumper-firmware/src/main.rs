//! Bumper - wheeled robot firmware
//!
//! Main firmware binary for RP2040-based two-wheel robots with an
//! ultrasonic bumper. Event handlers (buttons, sonar, serial receive,
//! motor actuator) run on an interrupt-priority executor so they preempt
//! the thread-mode poll loop but never each other.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use bumper_core::input::Button;
use bumper_hal_rp2040::pwm::MOTOR_PWM_FREQ_HZ;
use bumper_hal_rp2040::{RpModeSwitch, RpMotorOutputs, RpSonar};

use crate::config::ROBOT_CONFIG;

mod channels;
mod clock;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Executor for event handler tasks
static HANDLER_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    HANDLER_EXECUTOR.on_interrupt()
}

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Read by the poll loop and every button task
static MODE_SWITCH: StaticCell<RpModeSwitch> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Bumper firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ROBOT_CONFIG;
    info!(
        "Config: speeds {}/{}, watchdog {}ms, sonar {}ms/{}ms, policy {}",
        config.speed.low,
        config.speed.high,
        config.motor.watchdog_ms,
        config.sonar.period_ms,
        config.sonar.window_ms,
        config.sonar.stop_policy
    );

    // Serial command link (115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized");

    // Motor outputs: slice 1 = left wheel (GPIO2 fwd, GPIO3 rev),
    // slice 2 = right wheel (GPIO4 fwd, GPIO5 rev)
    let left = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, PwmConfig::default());
    let right = Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, PwmConfig::default());
    let outputs = RpMotorOutputs::new(left, right, MOTOR_PWM_FREQ_HZ);

    // Direction buttons, active low
    let btn_front = Input::new(p.PIN_6, Pull::Up);
    let btn_back = Input::new(p.PIN_7, Pull::Up);
    let btn_left = Input::new(p.PIN_8, Pull::Up);
    let btn_right = Input::new(p.PIN_9, Pull::Up);

    // Ultrasonic sensor
    let sonar = RpSonar::new(Output::new(p.PIN_10, Level::Low), Input::new(p.PIN_11, Pull::Down));
    let (trigger, echo) = sonar.split();

    // Mode switch: high = remote (serial) control
    let mode_switch: &'static RpModeSwitch =
        MODE_SWITCH.init(RpModeSwitch::new(Input::new(p.PIN_20, Pull::Down)));

    // Handler tasks preempt the thread-mode poll loop
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let handlers = HANDLER_EXECUTOR.start(interrupt::SWI_IRQ_1);

    handlers.spawn(tasks::motor_task(outputs, config.motor).unwrap());
    handlers.spawn(tasks::serial_rx_task(rx).unwrap());
    handlers.spawn(tasks::sonar_task(trigger, config.sonar).unwrap());
    handlers.spawn(tasks::echo_task(echo, config.sonar).unwrap());

    for (pin, button) in [
        (btn_front, Button::Front),
        (btn_back, Button::Back),
        (btn_left, Button::Left),
        (btn_right, Button::Right),
    ] {
        handlers.spawn(
            tasks::button_task(pin, button, mode_switch, config.speed, config.input).unwrap(),
        );
    }

    spawner.spawn(tasks::poll_task(tx, mode_switch, config.speed, config.poll).unwrap());
    spawner.spawn(tasks::telemetry_task(config.motor, config.sonar).unwrap());

    info!("All tasks spawned, firmware running");
}
