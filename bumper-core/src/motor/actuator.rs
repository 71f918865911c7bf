//! Motor actuator with movement watchdog
//!
//! `drive` writes the duty cycles straight to the outputs (no ramping) and
//! re-arms a single watchdog. If nothing refreshes it within the watchdog
//! duration, the outputs are forced to zero. Each new `drive` replaces the
//! pending deadline, so the last command wins.
//!
//! The actuator owns the outputs, so it is the only writer of hardware
//! state. After every change it publishes what is on the outputs into
//! [`SharedControl`] for the obstacle monitor and observers.
//!
//! ```ignore
//! let mut actuator = Actuator::new(outputs, &config.motor, &SHARED);
//! match actuator.drive(MotorCommand::for_direction(Direction::Forward, 0.3), now_ms)? {
//!     DriveOutcome::Applied => {}
//!     DriveOutcome::Suppressed => { /* obstacle ahead */ }
//! }
//!
//! // When the watchdog deadline passes:
//! actuator.poll_watchdog(now_ms);
//! ```

use crate::config::MotorConfig;
use crate::state::SharedControl;
use crate::timer::OneShot;
use crate::traits::MotorOutputs;

use super::command::{MotorCommand, MotorFault, OutputSnapshot};

/// What [`Actuator::drive`] did with a valid command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveOutcome {
    /// Written to the outputs, watchdog re-armed
    Applied,
    /// Dropped: it powers a forward channel while an obstacle is detected
    Suppressed,
}

/// Drives the four motor channels
pub struct Actuator<'a, O: MotorOutputs> {
    outputs: O,
    watchdog: OneShot,
    watchdog_ms: u32,
    shared: &'a SharedControl,
}

impl<'a, O: MotorOutputs> Actuator<'a, O> {
    /// Create an actuator with all outputs off
    pub fn new(mut outputs: O, config: &MotorConfig, shared: &'a SharedControl) -> Self {
        outputs.zero();
        let actuator = Self {
            outputs,
            watchdog: OneShot::new(),
            watchdog_ms: config.watchdog_ms,
            shared,
        };
        actuator.publish();
        actuator
    }

    /// Apply a command and re-arm the watchdog
    ///
    /// A command that powers both channels of a wheel pair is a
    /// programming fault: nothing is written and the fault is returned
    /// for the caller to report.
    ///
    /// The safety state is checked again in the same region that writes
    /// and publishes the outputs. An obstacle detected after the command
    /// was routed therefore still drops any command powering a forward
    /// channel, with the outputs and watchdog left as they were.
    pub fn drive(
        &mut self,
        command: MotorCommand,
        now_ms: u32,
    ) -> Result<DriveOutcome, MotorFault> {
        command.validate()?;

        let outputs = &mut self.outputs;
        let admitted = self.shared.update(|state| {
            if state.safety.is_blocked() && command.powers_forward() {
                return false;
            }
            outputs.set_duties(command.channels());
            state.outputs = OutputSnapshot {
                duties: outputs.duties(),
            };
            true
        });

        if !admitted {
            return Ok(DriveOutcome::Suppressed);
        }
        self.watchdog.arm(now_ms, self.watchdog_ms);
        Ok(DriveOutcome::Applied)
    }

    /// Force all outputs to zero and disarm the watchdog
    pub fn stop(&mut self) {
        self.outputs.zero();
        self.watchdog.cancel();
        self.publish();
    }

    /// Fire the watchdog if its deadline has passed
    ///
    /// Returns `true` when this call zeroed the outputs.
    pub fn poll_watchdog(&mut self, now_ms: u32) -> bool {
        if self.watchdog.poll(now_ms) {
            self.outputs.zero();
            self.publish();
            true
        } else {
            false
        }
    }

    /// Pending watchdog deadline, if a movement is running
    pub fn watchdog_deadline(&self) -> Option<u32> {
        self.watchdog.deadline()
    }

    /// Access the underlying outputs
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    fn publish(&self) {
        self.shared.publish_outputs(OutputSnapshot {
            duties: self.outputs.duties(),
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::motor::command::{
        Direction, WheelPair, CHANNEL_COUNT, LEFT_FORWARD, RIGHT_FORWARD,
    };
    use crate::state::SafetyState;
    use proptest::prelude::*;

    /// Outputs that remember every write
    #[derive(Default)]
    pub(crate) struct RecordingOutputs {
        pub duties: [f32; CHANNEL_COUNT],
        pub writes: usize,
        pub zeroings: usize,
    }

    impl MotorOutputs for RecordingOutputs {
        fn set_duties(&mut self, duties: [f32; CHANNEL_COUNT]) {
            if duties.iter().all(|&d| d == 0.0) && self.duties.iter().any(|&d| d != 0.0) {
                self.zeroings += 1;
            }
            self.duties = duties;
            self.writes += 1;
        }

        fn duties(&self) -> [f32; CHANNEL_COUNT] {
            self.duties
        }
    }

    fn actuator(shared: &SharedControl) -> Actuator<'_, RecordingOutputs> {
        Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, shared)
    }

    #[test]
    fn test_drive_sets_outputs_and_publishes() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);

        let cmd = MotorCommand::for_direction(Direction::Backward, 0.3);
        assert_eq!(act.drive(cmd, 0), Ok(DriveOutcome::Applied));

        assert_eq!(act.outputs().duties, [0.0, 0.3, 0.0, 0.3]);
        assert_eq!(shared.outputs().duties, [0.0, 0.3, 0.0, 0.3]);
        assert_eq!(act.watchdog_deadline(), Some(3000));
    }

    #[test]
    fn test_watchdog_zeroes_once() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);

        act.drive(MotorCommand::for_direction(Direction::Forward, 0.6), 0)
            .unwrap();

        let mut fired = 0;
        for now in (0..10_000).step_by(10) {
            if act.poll_watchdog(now) {
                assert_eq!(now, 3000);
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        assert_eq!(act.outputs().zeroings, 1);
        assert!(shared.outputs().duties.iter().all(|&d| d == 0.0));
        assert_eq!(act.watchdog_deadline(), None);
    }

    #[test]
    fn test_redrive_postpones_watchdog() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);
        let cmd = MotorCommand::for_direction(Direction::TurnLeft, 0.3);

        act.drive(cmd, 0).unwrap();
        act.drive(cmd, 2500).unwrap();

        assert!(!act.poll_watchdog(3000));
        assert!(shared.outputs().is_moving());
        assert!(act.poll_watchdog(5500));
        assert!(!shared.outputs().is_moving());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);

        act.drive(MotorCommand::for_direction(Direction::Forward, 0.3), 0)
            .unwrap();
        act.stop();
        act.stop();

        assert_eq!(act.outputs().duties, [0.0; CHANNEL_COUNT]);
        assert_eq!(act.watchdog_deadline(), None);
        // Disarmed watchdog never fires later
        assert!(!act.poll_watchdog(10_000));
        assert_eq!(act.outputs().zeroings, 1);
    }

    #[test]
    fn test_conflicting_command_aborts() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);

        let good = MotorCommand::for_direction(Direction::Forward, 0.3);
        act.drive(good, 0).unwrap();
        let writes = act.outputs().writes;

        let bad = MotorCommand::from_channels([0.0, 0.0, 0.4, 0.4]);
        assert_eq!(
            act.drive(bad, 100),
            Err(MotorFault::PairConflict(WheelPair::Right))
        );

        // Outputs and watchdog untouched
        assert_eq!(act.outputs().writes, writes);
        assert_eq!(act.outputs().duties, good.channels());
        assert_eq!(act.watchdog_deadline(), Some(3000));
    }

    #[test]
    fn test_blocked_drops_forward_power() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);
        shared.update(|state| state.safety = SafetyState::Blocked);

        for direction in [Direction::Forward, Direction::TurnLeft, Direction::TurnRight] {
            let cmd = MotorCommand::for_direction(direction, 0.6);
            assert_eq!(act.drive(cmd, 0), Ok(DriveOutcome::Suppressed));
        }
        assert_eq!(act.outputs().writes, 1);
        assert_eq!(act.watchdog_deadline(), None);
        assert!(!shared.outputs().is_moving());

        let reverse = MotorCommand::for_direction(Direction::Backward, 0.6);
        assert_eq!(act.drive(reverse, 0), Ok(DriveOutcome::Applied));
        assert_eq!(shared.outputs().duties, [0.0, 0.6, 0.0, 0.6]);
        assert_eq!(act.watchdog_deadline(), Some(3000));
    }

    #[test]
    fn test_blocked_keeps_running_reverse() {
        let shared = SharedControl::new();
        let mut act = actuator(&shared);

        let reverse = MotorCommand::for_direction(Direction::Backward, 0.3);
        act.drive(reverse, 0).unwrap();
        shared.update(|state| state.safety = SafetyState::Blocked);

        let forward = MotorCommand::for_direction(Direction::Forward, 0.3);
        assert_eq!(act.drive(forward, 1000), Ok(DriveOutcome::Suppressed));

        // Running reverse and its deadline stay as they were
        let duties = shared.outputs().duties;
        assert_eq!(duties[LEFT_FORWARD], 0.0);
        assert_eq!(duties[RIGHT_FORWARD], 0.0);
        assert!(shared.outputs().is_reversing());
        assert_eq!(act.watchdog_deadline(), Some(3000));
    }

    proptest! {
        #[test]
        fn prop_last_command_wins(gaps in proptest::collection::vec(1u32..2999, 1..20)) {
            let shared = SharedControl::new();
            let mut act = actuator(&shared);
            let cmd = MotorCommand::for_direction(Direction::Forward, 0.3);

            // Every re-drive lands before the pending deadline
            let mut now = 0u32;
            act.drive(cmd, now).unwrap();
            for gap in gaps {
                prop_assert!(!act.poll_watchdog(now + gap - 1));
                now += gap;
                act.drive(cmd, now).unwrap();
            }

            prop_assert!(!act.poll_watchdog(now + 2999));
            prop_assert!(shared.outputs().is_moving());
            prop_assert!(act.poll_watchdog(now + 3000));
            prop_assert_eq!(act.outputs().zeroings, 1);
        }
    }
}
