//! Main poll loop step
//!
//! One call to [`PollLoop::tick`] per tick interval. The loop only reads
//! and clears the pending-serial flag; the serial arrival handler only
//! raises it. Actuation is left to the caller through the returned
//! [`Routed`].

use crate::input::{InputError, InputRouter, Routed};
use crate::state::{InputMode, SharedControl};
use crate::traits::{ModeSwitch, SerialInput};

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Nothing to do
    Idle,
    /// Local mode: this many buffered serial bytes were discarded
    Drained(usize),
    /// Remote mode: one serial byte was resolved
    Routed(Routed),
}

/// Cooperative poll loop state
pub struct PollLoop<'a, M: ModeSwitch> {
    router: InputRouter<'a, M>,
    shared: &'a SharedControl,
}

impl<'a, M: ModeSwitch> PollLoop<'a, M> {
    pub fn new(router: InputRouter<'a, M>, shared: &'a SharedControl) -> Self {
        Self { router, shared }
    }

    /// Run one tick
    ///
    /// In `Local` mode the serial buffer is emptied so nothing typed before
    /// a switch to `Remote` gets executed. In `Remote` mode at most one
    /// byte is consumed per tick; the pending flag is raised again when
    /// more bytes are waiting.
    pub fn tick<S: SerialInput>(&mut self, serial: &mut S) -> Result<TickOutcome, InputError> {
        match self.router.mode() {
            InputMode::Local => {
                let dropped = serial.drain();
                self.shared.clear_serial_pending();
                if dropped > 0 {
                    Ok(TickOutcome::Drained(dropped))
                } else {
                    Ok(TickOutcome::Idle)
                }
            }
            InputMode::Remote => {
                if !self.shared.serial_pending() {
                    return Ok(TickOutcome::Idle);
                }

                // Cleared before reading: a byte arriving from here on
                // raises the flag again on its own
                self.shared.clear_serial_pending();
                let byte = serial.read_byte();
                if serial.is_readable() {
                    self.shared.raise_serial_pending();
                }

                match byte {
                    Some(byte) => self.router.route_serial(byte).map(TickOutcome::Routed),
                    None => Ok(TickOutcome::Idle),
                }
            }
        }
    }

    pub fn router(&self) -> &InputRouter<'a, M> {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::config::{MotorConfig, SpeedConfig};
    use crate::input::router::tests::FixedSwitch;
    use crate::motor::actuator::tests::RecordingOutputs;
    use crate::motor::command::{LEFT_FORWARD, RIGHT_FORWARD};
    use crate::motor::{Actuator, Direction, DriveOutcome, MotorCommand};
    use crate::state::{SafetyState, SpeedLevel};

    /// Serial receiver fed from a script; raises the pending flag like the
    /// arrival handler would
    struct ScriptedSerial<'a> {
        buffer: VecDeque<u8>,
        shared: &'a SharedControl,
    }

    impl<'a> ScriptedSerial<'a> {
        fn new(shared: &'a SharedControl) -> Self {
            Self {
                buffer: VecDeque::new(),
                shared,
            }
        }

        fn receive(&mut self, bytes: &[u8]) {
            for &byte in bytes {
                self.buffer.push_back(byte);
                self.shared.raise_serial_pending();
            }
        }
    }

    impl SerialInput for ScriptedSerial<'_> {
        fn is_readable(&self) -> bool {
            !self.buffer.is_empty()
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.buffer.pop_front()
        }
    }

    fn poll_loop<'a>(shared: &'a SharedControl, switch: &'a FixedSwitch) -> PollLoop<'a, &'a FixedSwitch> {
        let router = InputRouter::new(shared, &SpeedConfig::DEFAULT, switch);
        PollLoop::new(router, shared)
    }

    #[test]
    fn test_idle_without_pending_flag() {
        let shared = SharedControl::new();
        let switch = FixedSwitch::remote();
        let mut poll = poll_loop(&shared, &switch);
        let mut serial = ScriptedSerial::new(&shared);

        assert_eq!(poll.tick(&mut serial), Ok(TickOutcome::Idle));
    }

    #[test]
    fn test_remote_consumes_one_byte_per_tick() {
        let shared = SharedControl::new();
        let switch = FixedSwitch::remote();
        let mut poll = poll_loop(&shared, &switch);
        let mut serial = ScriptedSerial::new(&shared);

        serial.receive(b"2w");

        assert_eq!(
            poll.tick(&mut serial),
            Ok(TickOutcome::Routed(Routed::SpeedChanged(SpeedLevel::High)))
        );
        // Backlog keeps the flag raised
        assert!(shared.serial_pending());

        assert_eq!(
            poll.tick(&mut serial),
            Ok(TickOutcome::Routed(Routed::Drive(MotorCommand::for_direction(
                Direction::Forward,
                0.6
            ))))
        );
        assert!(!shared.serial_pending());
        assert_eq!(poll.tick(&mut serial), Ok(TickOutcome::Idle));
    }

    #[test]
    fn test_invalid_byte_reported_and_cleared() {
        let shared = SharedControl::new();
        let switch = FixedSwitch::remote();
        let mut poll = poll_loop(&shared, &switch);
        let mut serial = ScriptedSerial::new(&shared);

        serial.receive(b"?");

        assert_eq!(poll.tick(&mut serial), Err(InputError::InvalidCommand(b'?')));
        assert!(!shared.serial_pending());
        assert_eq!(shared.snapshot().speed, SpeedLevel::Low);
    }

    #[test]
    fn test_switch_to_remote_discards_local_noise() {
        let shared = SharedControl::new();
        let switch = FixedSwitch::local();
        let mut poll = poll_loop(&shared, &switch);
        let mut serial = ScriptedSerial::new(&shared);

        serial.receive(b"ww2");
        assert_eq!(poll.tick(&mut serial), Ok(TickOutcome::Drained(3)));
        assert!(!shared.serial_pending());

        switch.0.set(true);
        assert_eq!(poll.tick(&mut serial), Ok(TickOutcome::Idle));
        assert_eq!(shared.speed(), SpeedLevel::Low);
    }

    #[test]
    fn test_blocked_remote_scenario() {
        let shared = SharedControl::new();
        let switch = FixedSwitch::remote();
        let mut poll = poll_loop(&shared, &switch);
        let mut serial = ScriptedSerial::new(&shared);
        let mut act = Actuator::new(RecordingOutputs::default(), &MotorConfig::DEFAULT, &shared);

        shared.update(|state| state.safety = SafetyState::Blocked);

        // `w` while blocked changes nothing
        serial.receive(b"w");
        let outcome = poll.tick(&mut serial);
        assert_eq!(
            outcome,
            Ok(TickOutcome::Routed(Routed::Suppressed(Direction::Forward)))
        );
        assert!(!shared.outputs().is_moving());

        // `s` while blocked reverses at the current speed
        serial.receive(b"s");
        if let Ok(TickOutcome::Routed(Routed::Drive(cmd))) = poll.tick(&mut serial) {
            assert_eq!(act.drive(cmd, 0), Ok(DriveOutcome::Applied));
        }
        let duties = shared.outputs().duties;
        assert_eq!(duties, [0.0, 0.3, 0.0, 0.3]);
        assert_eq!(duties[LEFT_FORWARD], 0.0);
        assert_eq!(duties[RIGHT_FORWARD], 0.0);
    }
}
