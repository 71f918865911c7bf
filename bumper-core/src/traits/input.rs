//! Input source traits

use crate::state::InputMode;

/// Buffered serial receiver
///
/// Both operations are non-blocking.
pub trait SerialInput {
    /// Check if at least one byte is buffered
    fn is_readable(&self) -> bool;

    /// Take one buffered byte, if any
    fn read_byte(&mut self) -> Option<u8>;

    /// Discard everything currently buffered
    ///
    /// Returns the number of bytes dropped.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.read_byte().is_some() {
            dropped += 1;
        }
        dropped
    }
}

/// Local/remote mode switch
///
/// Read directly on every decision; no debouncing.
pub trait ModeSwitch {
    /// Check if the switch reads high
    fn is_high(&self) -> bool;

    /// Input mode selected by the current level
    fn mode(&self) -> InputMode {
        InputMode::from_level(self.is_high())
    }
}

impl<T: ModeSwitch + ?Sized> ModeSwitch for &T {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}
