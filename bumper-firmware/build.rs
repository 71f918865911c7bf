//! Build script for bumper-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates robot.toml
//! - Generates the `ROBOT_CONFIG` constant included by `src/config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bumper_core::config::RobotConfig;

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate robot.toml
fn load_config() -> RobotConfig {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a robot.toml configuration file in the    ║\n\
            ║  bumper-firmware directory. An empty file selects the defaults.  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read robot.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: RobotConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid robot.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml validation failed                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&e.to_string())
        );
    }

    println!("cargo:warning=robot.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `robot_config.rs` into OUT_DIR
fn generate_config(config: &RobotConfig) {
    let code = format!(
        "/// Robot configuration from robot.toml\n\
         pub const ROBOT_CONFIG: RobotConfig = RobotConfig {{\n\
         \x20   speed: SpeedConfig {{ low: {:?}_f32, high: {:?}_f32 }},\n\
         \x20   motor: MotorConfig {{ watchdog_ms: {}, activation_threshold: {:?}_f32 }},\n\
         \x20   sonar: SonarConfig {{ period_ms: {}, window_ms: {}, stop_policy: BlockStopPolicy::{:?} }},\n\
         \x20   input: InputConfig {{ debounce_ms: {} }},\n\
         \x20   poll: PollConfig {{ interval_ms: {} }},\n\
         }};\n",
        config.speed.low,
        config.speed.high,
        config.motor.watchdog_ms,
        config.motor.activation_threshold,
        config.sonar.period_ms,
        config.sonar.window_ms,
        config.sonar.stop_policy,
        config.input.debounce_ms,
        config.poll.interval_ms,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("robot_config.rs"), code).unwrap();
}
