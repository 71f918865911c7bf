//! Obstacle monitor
//!
//! Periodic ultrasonic measurement with a bounded detection window:
//!
//! ```text
//!            trigger                       echo (first)
//!   Idle ─────────────► Measuring ─────────────────────► Blocked
//!    ▲                      │
//!    └──────────────────────┘
//!          window expiry (first)
//! ```
//!
//! Echo and window expiry race for the same measurement. Both consume the
//! [`DetectionWindow`] inside one critical section and only the winner
//! writes [`SafetyState`]; the loser is a silent no-op. `Blocked` is only
//! the safety flag: the next trigger opens a new window regardless.

use crate::config::{BlockStopPolicy, SonarConfig};
use crate::state::{DetectionWindow, SafetyState, SharedControl};

/// Observable monitor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorPhase {
    /// No measurement outstanding, path clear
    Idle,
    /// Waiting for echo or window expiry
    Measuring,
    /// No measurement outstanding, obstacle detected
    Blocked,
}

/// Result of an echo event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoOutcome {
    /// Window already resolved (late or duplicate echo)
    Ignored,
    /// This echo resolved the window and set the safety state to blocked
    Blocked {
        /// Safety state was clear before this echo
        newly_blocked: bool,
        /// Caller must stop the actuator now
        stop_motors: bool,
    },
}

/// Result of a window expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowOutcome {
    /// Window already resolved or not yet due
    Ignored,
    /// This expiry resolved the window and cleared the safety state
    Cleared {
        /// Safety state was blocked before this expiry
        was_blocked: bool,
    },
}

/// Ultrasonic obstacle monitor
///
/// Holds no state of its own; the window and safety flag live in
/// [`SharedControl`], so any handler can drive it through a shared
/// reference.
pub struct ObstacleMonitor<'a> {
    shared: &'a SharedControl,
    config: SonarConfig,
}

impl<'a> ObstacleMonitor<'a> {
    /// Create a monitor over the shared state
    pub fn new(shared: &'a SharedControl, config: &SonarConfig) -> Self {
        Self {
            shared,
            config: *config,
        }
    }

    /// Trigger period in ms
    pub fn period_ms(&self) -> u32 {
        self.config.period_ms
    }

    /// Open a detection window (periodic trigger)
    ///
    /// Call right before requesting a measurement from the sensor. An
    /// outstanding window is replaced, which cancels its pending expiry.
    /// Returns the window deadline.
    pub fn begin_measurement(&self, now_ms: u32) -> u32 {
        let window = DetectionWindow::open(now_ms, self.config.window_ms);
        self.shared.update(|state| state.window = window);
        now_ms.wrapping_add(self.config.window_ms)
    }

    /// Handle a sensor echo
    ///
    /// The caller stops the actuator when the outcome asks for it; no
    /// actuation happens inside the critical section.
    pub fn on_echo(&self) -> EchoOutcome {
        let policy = self.config.stop_policy;

        self.shared.update(|state| {
            if !state.window.resolve() {
                return EchoOutcome::Ignored;
            }

            let newly_blocked = !state.safety.is_blocked();
            state.safety = SafetyState::Blocked;

            let stop_motors = match policy {
                BlockStopPolicy::Reversing => state.outputs.is_reversing(),
                BlockStopPolicy::AnyMotion => state.outputs.is_moving(),
            };

            EchoOutcome::Blocked {
                newly_blocked,
                stop_motors,
            }
        })
    }

    /// Handle the window timer firing
    ///
    /// The caller owns the timer and fires it at the deadline returned by
    /// [`begin_measurement`](Self::begin_measurement).
    pub fn on_window_expired(&self) -> WindowOutcome {
        self.shared.update(|state| {
            if !state.window.resolve() {
                return WindowOutcome::Ignored;
            }
            let was_blocked = state.safety.is_blocked();
            state.safety = SafetyState::Clear;
            WindowOutcome::Cleared { was_blocked }
        })
    }

    /// Current phase derived from the shared state
    pub fn phase(&self) -> MonitorPhase {
        let state = self.shared.snapshot();
        if state.window.is_outstanding() {
            MonitorPhase::Measuring
        } else if state.safety.is_blocked() {
            MonitorPhase::Blocked
        } else {
            MonitorPhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MotorConfig, SpeedConfig};
    use crate::input::router::tests::FixedSwitch;
    use crate::input::{Button, InputRouter, Routed};
    use crate::motor::actuator::tests::RecordingOutputs;
    use crate::motor::command::{LEFT_FORWARD, RIGHT_FORWARD};
    use crate::motor::{Actuator, Direction, DriveOutcome, MotorCommand};
    use proptest::prelude::*;

    fn monitor(shared: &SharedControl) -> ObstacleMonitor<'_> {
        ObstacleMonitor::new(shared, &SonarConfig::DEFAULT)
    }

    #[test]
    fn test_trigger_enters_measuring() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);

        assert_eq!(mon.phase(), MonitorPhase::Idle);
        assert_eq!(mon.begin_measurement(500), 550);
        assert_eq!(mon.phase(), MonitorPhase::Measuring);
        assert_eq!(shared.snapshot().window.deadline(), Some(550));
    }

    #[test]
    fn test_no_echo_clears() {
        let shared = SharedControl::new();
        shared.update(|state| state.safety = SafetyState::Blocked);
        let mon = monitor(&shared);

        mon.begin_measurement(0);
        assert_eq!(mon.phase(), MonitorPhase::Measuring);

        assert_eq!(
            mon.on_window_expired(),
            WindowOutcome::Cleared { was_blocked: true }
        );
        assert_eq!(shared.safety(), SafetyState::Clear);
        assert_eq!(mon.phase(), MonitorPhase::Idle);
    }

    #[test]
    fn test_echo_while_reversing_stops_motors() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        act.drive(MotorCommand::for_direction(Direction::Backward, 0.3), 0)
            .unwrap();
        mon.begin_measurement(500);

        // Echo 20 ms into the window
        let outcome = mon.on_echo();
        assert_eq!(
            outcome,
            EchoOutcome::Blocked {
                newly_blocked: true,
                stop_motors: true
            }
        );
        if let EchoOutcome::Blocked { stop_motors: true, .. } = outcome {
            act.stop();
        }

        assert_eq!(shared.safety(), SafetyState::Blocked);
        assert!(!shared.outputs().is_moving());
        assert_eq!(act.watchdog_deadline(), None);

        // Window expiry at 550 loses the race
        assert_eq!(mon.on_window_expired(), WindowOutcome::Ignored);
        assert_eq!(shared.safety(), SafetyState::Blocked);
        assert_eq!(mon.phase(), MonitorPhase::Blocked);
    }

    #[test]
    fn test_echo_while_forward_keeps_motors() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        act.drive(MotorCommand::for_direction(Direction::Forward, 0.3), 0)
            .unwrap();
        mon.begin_measurement(0);

        assert_eq!(
            mon.on_echo(),
            EchoOutcome::Blocked {
                newly_blocked: true,
                stop_motors: false
            }
        );
    }

    #[test]
    fn test_any_motion_policy_stops_forward() {
        let shared = SharedControl::new();
        let config = SonarConfig {
            stop_policy: BlockStopPolicy::AnyMotion,
            ..SonarConfig::DEFAULT
        };
        let mon = ObstacleMonitor::new(&shared, &config);
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        act.drive(MotorCommand::for_direction(Direction::TurnRight, 0.3), 0)
            .unwrap();
        mon.begin_measurement(0);

        assert!(matches!(
            mon.on_echo(),
            EchoOutcome::Blocked {
                stop_motors: true,
                ..
            }
        ));
    }

    #[test]
    fn test_stale_echo_ignored() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);

        mon.begin_measurement(0);
        assert_eq!(
            mon.on_window_expired(),
            WindowOutcome::Cleared { was_blocked: false }
        );

        // Echo arriving after the timeout already fired
        assert_eq!(mon.on_echo(), EchoOutcome::Ignored);
        assert_eq!(shared.safety(), SafetyState::Clear);
    }

    #[test]
    fn test_repeated_block_is_idempotent() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);

        mon.begin_measurement(0);
        mon.on_echo();
        mon.begin_measurement(500);

        // Re-triggering while blocked still measures
        assert_eq!(mon.phase(), MonitorPhase::Measuring);
        assert_eq!(
            mon.on_echo(),
            EchoOutcome::Blocked {
                newly_blocked: false,
                stop_motors: false
            }
        );
        assert_eq!(shared.safety(), SafetyState::Blocked);
    }

    #[test]
    fn test_retrigger_replaces_pending_window() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);

        mon.begin_measurement(0);
        assert_eq!(mon.begin_measurement(30), 80);

        // One window outstanding, resolved once
        assert_eq!(shared.snapshot().window.deadline(), Some(80));
        assert!(matches!(
            mon.on_window_expired(),
            WindowOutcome::Cleared { .. }
        ));
        assert_eq!(mon.on_window_expired(), WindowOutcome::Ignored);
    }

    #[test]
    fn test_echo_between_route_and_apply_drops_forward() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);
        let router = InputRouter::new(&shared, &SpeedConfig::DEFAULT, FixedSwitch::local());
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        mon.begin_measurement(0);

        // Routed while clear, applied after the echo blocked
        let Routed::Drive(cmd) = router.route_button(Button::Front) else {
            panic!("front button not routed");
        };
        assert_eq!(
            mon.on_echo(),
            EchoOutcome::Blocked {
                newly_blocked: true,
                stop_motors: false
            }
        );
        assert_eq!(act.drive(cmd, 10), Ok(DriveOutcome::Suppressed));

        let duties = shared.outputs().duties;
        assert_eq!(duties[LEFT_FORWARD], 0.0);
        assert_eq!(duties[RIGHT_FORWARD], 0.0);
        assert_eq!(act.outputs().duties, duties);
        assert_eq!(act.watchdog_deadline(), None);
    }

    #[test]
    fn test_reverse_routed_before_echo_still_applies() {
        let shared = SharedControl::new();
        let mon = monitor(&shared);
        let router = InputRouter::new(&shared, &SpeedConfig::DEFAULT, FixedSwitch::local());
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        mon.begin_measurement(0);
        let Routed::Drive(cmd) = router.route_button(Button::Back) else {
            panic!("back button not routed");
        };
        mon.on_echo();

        assert_eq!(act.drive(cmd, 10), Ok(DriveOutcome::Applied));
        assert!(shared.outputs().is_reversing());
    }

    #[derive(Debug, Clone, Copy)]
    enum Completion {
        Echo,
        Expire,
    }

    fn completion() -> impl Strategy<Value = Completion> {
        prop_oneof![Just(Completion::Echo), Just(Completion::Expire)]
    }

    proptest! {
        #[test]
        fn prop_single_writer_per_measurement(
            initially_blocked in any::<bool>(),
            events in proptest::collection::vec(completion(), 0..8),
        ) {
            let shared = SharedControl::new();
            if initially_blocked {
                shared.update(|state| state.safety = SafetyState::Blocked);
            }
            let mon = monitor(&shared);
            mon.begin_measurement(0);

            let mut winners = 0;
            let mut expected = None;
            for event in &events {
                let won = match event {
                    Completion::Echo => mon.on_echo() != EchoOutcome::Ignored,
                    Completion::Expire => mon.on_window_expired() != WindowOutcome::Ignored,
                };
                if won {
                    winners += 1;
                    expected = Some(match event {
                        Completion::Echo => SafetyState::Blocked,
                        Completion::Expire => SafetyState::Clear,
                    });
                }
            }

            // The window deadline always closes the measurement
            let closing = mon.on_window_expired();
            if winners == 0 {
                prop_assert!(
                    matches!(closing, WindowOutcome::Cleared { .. }),
                    "unresolved window must clear at its deadline"
                );
                expected = Some(SafetyState::Clear);
                winners = 1;
            } else {
                prop_assert_eq!(closing, WindowOutcome::Ignored);
            }

            prop_assert_eq!(winners, 1);
            prop_assert_eq!(Some(shared.safety()), expected);
            prop_assert!(shared.snapshot().window.deadline().is_none());
        }
    }
}
