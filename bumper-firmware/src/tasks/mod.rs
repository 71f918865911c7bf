//! Embassy async tasks
//!
//! Handler tasks (buttons, sonar, echo, serial receive, motor) run on the
//! interrupt executor. The poll loop and telemetry run in thread mode.

pub mod buttons;
pub mod echo;
pub mod motor;
pub mod poll;
pub mod serial_rx;
pub mod sonar;
pub mod telemetry;

pub use buttons::button_task;
pub use echo::echo_task;
pub use motor::motor_task;
pub use poll::poll_task;
pub use serial_rx::serial_rx_task;
pub use sonar::sonar_task;
pub use telemetry::telemetry_task;
