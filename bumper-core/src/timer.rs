//! Single-shot, re-armable deadline timers
//!
//! Time is expressed as milliseconds since boot in a wrapping `u32`,
//! the same unit the firmware derives from `embassy_time::Instant`.
//! A timer only records its deadline; the owner decides how to wait for it
//! (an async `Timer::at` on target, explicit `poll` calls in tests).

/// Check whether `now_ms` has reached `deadline_ms`
///
/// Comparison is done on the wrapped difference so it stays correct across
/// the ~49 day rollover of the millisecond counter.
pub fn deadline_reached(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) >= 0
}

/// Single-shot timer handle
///
/// Arming an already armed timer replaces the pending deadline, which
/// implicitly cancels the earlier firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OneShot {
    deadline_ms: Option<u32>,
}

impl OneShot {
    /// Create a disarmed timer
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Arm (or re-arm) the timer to fire `duration_ms` after `now_ms`
    ///
    /// Returns the new deadline.
    pub fn arm(&mut self, now_ms: u32, duration_ms: u32) -> u32 {
        let deadline = now_ms.wrapping_add(duration_ms);
        self.deadline_ms = Some(deadline);
        deadline
    }

    /// Disarm the timer without firing
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Check if a firing is pending
    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Get the pending deadline, if armed
    pub fn deadline(&self) -> Option<u32> {
        self.deadline_ms
    }

    /// Fire the timer if its deadline has been reached
    ///
    /// Returns `true` exactly once per arming; the timer disarms itself
    /// when it fires.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        match self.deadline_ms {
            Some(deadline) if deadline_reached(now_ms, deadline) => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
