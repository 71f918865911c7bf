//! Shared control state
//!
//! Everything written from more than one execution context lives in
//! [`ControlState`], and every access goes through [`SharedControl`]:
//! a blocking mutex over a critical section. A region is a closure, so
//! the critical section is released on every exit path.
//!
//! Regions must stay short: no I/O, no device access and no awaiting
//! inside the closure. The state sits in a `RefCell`, so opening a region
//! (or taking a snapshot) from inside another region panics instead of
//! letting one of the two writes get lost.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::SpeedConfig;
use crate::motor::OutputSnapshot;

/// Obstacle safety flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyState {
    /// No obstacle in range
    #[default]
    Clear,
    /// Obstacle detected: forward motion suppressed, reverse allowed
    Blocked,
}

impl SafetyState {
    /// Check if forward motion is currently suppressed
    pub fn is_blocked(&self) -> bool {
        *self == SafetyState::Blocked
    }
}

/// Selected speed preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedLevel {
    #[default]
    Low,
    High,
}

impl SpeedLevel {
    /// Duty cycle of this preset
    pub fn duty(&self, speeds: &SpeedConfig) -> f32 {
        match self {
            SpeedLevel::Low => speeds.low,
            SpeedLevel::High => speeds.high,
        }
    }
}

/// Who drives the robot, derived from the mode switch level
///
/// Never stored: it is read from the switch at each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    /// Buttons drive the robot
    Local,
    /// Serial commands drive the robot, buttons are ignored
    Remote,
}

impl InputMode {
    /// Map the switch level: high selects remote control
    pub fn from_level(high: bool) -> Self {
        if high {
            InputMode::Remote
        } else {
            InputMode::Local
        }
    }
}

/// Outstanding sensor measurement
///
/// Opened by a trigger, resolved by the first of echo or deadline expiry.
/// [`DetectionWindow::resolve`] is the single consuming flag: only the
/// first caller gets `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectionWindow {
    outstanding: bool,
    deadline_ms: u32,
}

impl DetectionWindow {
    /// No measurement in flight
    pub const CLOSED: Self = Self {
        outstanding: false,
        deadline_ms: 0,
    };

    /// Open a window that expires `window_ms` after `now_ms`
    pub fn open(now_ms: u32, window_ms: u32) -> Self {
        Self {
            outstanding: true,
            deadline_ms: now_ms.wrapping_add(window_ms),
        }
    }

    /// Check if a measurement is waiting for resolution
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Deadline of the outstanding measurement
    pub fn deadline(&self) -> Option<u32> {
        self.outstanding.then_some(self.deadline_ms)
    }

    /// Consume the window
    ///
    /// Returns `true` if the window was outstanding, i.e. the caller is the
    /// sole writer of the safety state for this measurement.
    pub fn resolve(&mut self) -> bool {
        core::mem::replace(&mut self.outstanding, false)
    }
}

/// Fields shared between handlers and the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// Obstacle safety flag
    pub safety: SafetyState,
    /// Selected speed preset
    pub speed: SpeedLevel,
    /// A serial byte arrived and has not been consumed by the poll loop
    pub serial_pending: bool,
    /// Current sensor measurement
    pub window: DetectionWindow,
    /// Duty cycles last applied by the actuator
    pub outputs: OutputSnapshot,
}

impl ControlState {
    /// Power-on state
    pub const INITIAL: Self = Self {
        safety: SafetyState::Clear,
        speed: SpeedLevel::Low,
        serial_pending: false,
        window: DetectionWindow::CLOSED,
        outputs: OutputSnapshot::IDLE,
    };
}

/// Critical-section protected [`ControlState`]
///
/// `const`-constructible so the firmware can place it in a `static`.
pub struct SharedControl {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ControlState>>,
}

impl Default for SharedControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedControl {
    /// Create shared state in its power-on configuration
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ControlState::INITIAL)),
        }
    }

    /// Consistent copy of every field
    pub fn snapshot(&self) -> ControlState {
        self.inner.lock(|cell| *cell.borrow())
    }

    /// Run `f` on the state inside one critical section
    ///
    /// All mutations made by `f` become visible atomically.
    ///
    /// # Panics
    ///
    /// If `f` touches this `SharedControl` again.
    pub fn update<R>(&self, f: impl FnOnce(&mut ControlState) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Current safety flag
    pub fn safety(&self) -> SafetyState {
        self.snapshot().safety
    }

    /// Current speed preset
    pub fn speed(&self) -> SpeedLevel {
        self.snapshot().speed
    }

    /// Select a speed preset
    pub fn set_speed(&self, speed: SpeedLevel) {
        self.update(|state| state.speed = speed);
    }

    /// Mark that a serial byte arrived (serial handler)
    pub fn raise_serial_pending(&self) {
        self.update(|state| state.serial_pending = true);
    }

    /// Check the pending-serial flag
    pub fn serial_pending(&self) -> bool {
        self.snapshot().serial_pending
    }

    /// Clear the pending-serial flag
    pub fn clear_serial_pending(&self) {
        self.update(|state| state.serial_pending = false);
    }

    /// Record the duty cycles now on the outputs
    pub fn publish_outputs(&self, outputs: OutputSnapshot) {
        self.update(|state| state.outputs = outputs);
    }

    /// Duty cycles last applied by the actuator
    pub fn outputs(&self) -> OutputSnapshot {
        self.snapshot().outputs
    }
}
