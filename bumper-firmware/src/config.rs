//! Build-time robot configuration
//!
//! `build.rs` turns robot.toml into the `ROBOT_CONFIG` constant below.

use bumper_core::config::{
    BlockStopPolicy, InputConfig, MotorConfig, PollConfig, RobotConfig, SonarConfig, SpeedConfig,
};

include!(concat!(env!("OUT_DIR"), "/robot_config.rs"));
